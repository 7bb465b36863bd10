//! Record shape descriptors.
//!
//! A [`RecordShape`] is the explicit, caller-visible description of a record type:
//! the column name of each field and the [`Kind`] it expects. The result mapper is
//! driven entirely by it, so no runtime introspection is involved.

use crate::value::Kind;
use std::sync::Arc;

/// One field of a record shape.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldShape {
    /// Column / map key this field is read from and written to.
    pub name: String,
    pub kind: Kind,
}

/// Field name → kind descriptor for a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordShape {
    name: String,
    fields: Vec<FieldShape>,
}

impl RecordShape {
    /// Start a shape for the record type `name` (used in diagnostics only).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a scalar or nested field.
    ///
    /// A later field with the same name replaces the earlier one.
    pub fn field(mut self, name: impl Into<String>, kind: Kind) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.kind = kind,
            None => self.fields.push(FieldShape { name, kind }),
        }
        self
    }

    /// Add a nested record field.
    pub fn nested(self, name: impl Into<String>, shape: RecordShape) -> Self {
        self.field(name, Kind::Record(Arc::new(shape)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldShape] {
        &self.fields
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, name: &str) -> Option<&FieldShape> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
