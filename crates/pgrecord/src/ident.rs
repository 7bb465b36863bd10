//! SQL identifier validation and quoting.
//!
//! Identifiers (tables, columns, databases) cannot be bound as parameters, so they are
//! the only caller-supplied text embedded in statements. [`Ident`] validates them and
//! renders them with Postgres identifier quoting (`"..."`, `"` doubled), which is
//! distinct from value quoting (`'...'`) and never used for values.
//!
//! - Bare parts must match `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted parts (`"Mixed Case"`) allow anything except NUL
//! - Dotted paths (`public.users`) are split into parts

use crate::error::{OrmError, OrmResult};
use std::iter::Peekable;
use std::str::Chars;

/// One dot-separated segment of an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    Bare(String),
    Quoted(String),
}

impl IdentPart {
    fn name(&self) -> &str {
        match self {
            IdentPart::Bare(s) | IdentPart::Quoted(s) => s,
        }
    }
}

/// A validated SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    parts: Vec<IdentPart>,
}

impl Ident {
    /// Treat `name` as a single identifier taken verbatim (no dot splitting).
    pub fn quoted(name: &str) -> OrmResult<Self> {
        check_not_empty_or_nul(name)?;
        Ok(Self {
            parts: vec![IdentPart::Quoted(name.to_string())],
        })
    }

    /// A single column name taken verbatim.
    ///
    /// Renders bare when that reads back as the same name (lowercase, not a
    /// reserved word), quoted otherwise: `status`, `"createdAt"`, `"order"`.
    pub fn column(name: &str) -> OrmResult<Self> {
        check_not_empty_or_nul(name)?;
        let part = if is_plain_lowercase(name) && !is_reserved(name) {
            IdentPart::Bare(name.to_string())
        } else {
            IdentPart::Quoted(name.to_string())
        };
        Ok(Self { parts: vec![part] })
    }

    /// Parse `name`, `schema.name` or `"Quoted"."Name"` forms.
    pub fn parse(s: &str) -> OrmResult<Self> {
        check_not_empty_or_nul(s)?;

        let mut chars = s.chars().peekable();
        let mut parts = Vec::new();
        loop {
            let part = if chars.peek() == Some(&'"') {
                chars.next();
                parse_quoted_part(&mut chars)?
            } else {
                parse_bare_part(&mut chars)?
            };
            parts.push(part);

            match chars.next() {
                None => break,
                Some('.') if chars.peek().is_some() => continue,
                Some('.') => return Err(OrmError::build("trailing '.' in identifier")),
                Some(c) => {
                    return Err(OrmError::build(format!(
                        "unexpected '{c}' after identifier part in {s:?}"
                    )));
                }
            }
        }
        Ok(Self { parts })
    }

    /// Render as written: bare parts stay bare, quoted parts are quoted.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out, false);
        out
    }

    /// Render with every part quoted.
    pub fn to_quoted_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out, true);
        out
    }

    /// Last part without quoting (e.g. the table name of `public.users`).
    pub fn base_name(&self) -> &str {
        self.parts.last().map(IdentPart::name).unwrap_or_default()
    }

    /// Part before the base name (`public` in `public.users`), if any.
    pub fn qualifier(&self) -> Option<&str> {
        let idx = self.parts.len().checked_sub(2)?;
        self.parts.get(idx).map(IdentPart::name)
    }

    pub(crate) fn write_sql(&self, out: &mut String, force_quotes: bool) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Bare(s) if !force_quotes => out.push_str(s),
                IdentPart::Bare(s) | IdentPart::Quoted(s) => push_quoted(out, s),
            }
        }
    }
}

fn check_not_empty_or_nul(s: &str) -> OrmResult<()> {
    if s.is_empty() {
        return Err(OrmError::build("identifier cannot be empty"));
    }
    if s.contains('\0') {
        return Err(OrmError::build("identifier cannot contain NUL"));
    }
    Ok(())
}

fn is_plain_lowercase(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_lowercase())
        && chars.all(|c| c == '_' || c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// Keywords that cannot appear bare as a column name.
const RESERVED: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric",
    "authorization", "binary", "both", "case", "cast", "check", "collate", "collation",
    "column", "concurrently", "constraint", "create", "cross", "current_catalog",
    "current_date", "current_role", "current_schema", "current_time", "current_timestamp",
    "current_user", "default", "deferrable", "desc", "distinct", "do", "else", "end",
    "except", "false", "fetch", "for", "foreign", "freeze", "from", "full", "grant",
    "group", "having", "ilike", "in", "initially", "inner", "intersect", "into", "is",
    "isnull", "join", "lateral", "leading", "left", "like", "limit", "localtime",
    "localtimestamp", "natural", "not", "notnull", "null", "offset", "on", "only", "or",
    "order", "outer", "overlaps", "placing", "primary", "references", "returning", "right",
    "select", "session_user", "similar", "some", "symmetric", "system_user", "table",
    "tablesample", "then", "to", "trailing", "true", "union", "unique", "user", "using",
    "variadic", "verbose", "when", "where", "window", "with",
];

fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

fn parse_quoted_part(chars: &mut Peekable<Chars<'_>>) -> OrmResult<IdentPart> {
    let mut name = String::new();
    loop {
        match chars.next() {
            Some('"') if chars.peek() == Some(&'"') => {
                chars.next();
                name.push('"');
            }
            Some('"') => break,
            Some(c) => name.push(c),
            None => return Err(OrmError::build("unclosed quoted identifier")),
        }
    }
    if name.is_empty() {
        return Err(OrmError::build("empty quoted identifier"));
    }
    Ok(IdentPart::Quoted(name))
}

fn parse_bare_part(chars: &mut Peekable<Chars<'_>>) -> OrmResult<IdentPart> {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        let ok = if name.is_empty() {
            c == '_' || c.is_ascii_alphabetic()
        } else {
            c == '_' || c == '$' || c.is_ascii_alphanumeric()
        };
        if !ok {
            break;
        }
        name.push(c);
        chars.next();
    }
    if name.is_empty() {
        return match chars.peek() {
            Some(c) => Err(OrmError::build(format!(
                "invalid identifier start character '{c}'"
            ))),
            None => Err(OrmError::build("empty identifier segment")),
        };
    }
    Ok(IdentPart::Bare(name))
}

fn push_quoted(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
}

/// Quote a single name as an identifier (`users` → `"users"`).
pub fn quote_ident(name: &str) -> OrmResult<String> {
    Ok(Ident::quoted(name)?.to_quoted_sql())
}

/// Conversion into [`Ident`] for builder-style APIs.
pub trait IntoIdent {
    fn into_ident(self) -> OrmResult<Ident>;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> OrmResult<Ident> {
        Ok(self)
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> OrmResult<Ident> {
        Ok(self.clone())
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> OrmResult<Ident> {
        Ident::parse(self)
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> OrmResult<Ident> {
        Ident::parse(&self)
    }
}
