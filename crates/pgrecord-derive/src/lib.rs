//! Derive macros for pgrecord
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod record;

/// Derive the `Record` trait for a struct with named fields.
///
/// Generates the record shape used by the result mapper, the flattener
/// (`to_field_map`) and its inverse (`from_field_map`).
///
/// # Example
///
/// ```ignore
/// use pgrecord::Record;
///
/// #[derive(Record)]
/// #[record(rename_all = "snake_case")]
/// struct User {
///     id: i64,
///     #[record(column = "full_name")]
///     name: String,
///     nickname: Option<String>,
///     #[record(nested)]
///     address: Address,
///     #[record(skip)]
///     cached_score: u32,
/// }
/// ```
///
/// # Attributes
///
/// - `#[record(column = "name")]` - Map field to a different column name
/// - `#[record(nested)]` - Field is itself a `Record`, stored as a nested map
/// - `#[record(skip)]` - Leave the field out; it is rebuilt with `Default`
/// - `#[record(rename_all = "...")]` (struct) - `snake_case`, `camelCase`, `PascalCase`,
///   `SCREAMING_SNAKE_CASE`, `kebab-case`, `lowercase` or `UPPERCASE`
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
