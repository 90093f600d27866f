//! Records: one decoded or constructed instance of a struct kind.

use std::{fmt, sync::Arc};

use crate::{errors::WriteError, schema::Schema, value::Value};

/// Field values of one struct instance, in the declaration order of its [Schema].
///
/// Records compare equal when they belong to the same struct kind, or to struct kinds with
/// the same name and field names, and hold equal values field by field.
#[derive(Clone)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl Record {
    pub(crate) fn from_parts(schema: Arc<Schema>, values: Vec<Value>) -> Self {
        debug_assert_eq!(schema.fields().len(), values.len());
        Record { schema, values }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.index_of(name).map(|i| &self.values[i])
    }

    /// Replaces the value of `name`, returning the previous one. The value is stored as given.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<Value, WriteError> {
        let i = self
            .schema
            .index_of(name)
            .ok_or_else(|| WriteError::UnknownField(name.to_string()))?;

        Ok(std::mem::replace(&mut self.values[i], value.into()))
    }

    /// `(name, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.values.iter())
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Encodes the record with its own schema.
    pub fn build(&self) -> Result<Vec<u8>, WriteError> {
        self.schema.build(self)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        let same_kind = Arc::ptr_eq(&self.schema, &other.schema)
            || (self.schema.name() == other.schema.name()
                && self
                    .schema
                    .fields()
                    .iter()
                    .map(|f| &f.name)
                    .eq(other.schema.fields().iter().map(|f| &f.name)));

        same_kind && self.values == other.values
    }
}

impl Eq for Record {}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.schema.name())?;
        for (i, (name, value)) in self.fields().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
