//! Per-call accumulator of already-resolved field values.

use crate::value::Value;

/// Field values visible to a codec during one decode or encode call.
///
/// While decoding, entries are appended in declaration order as each field resolves, so a
/// codec only ever sees the fields declared before it. While encoding, the context is a
/// snapshot of every field of the record being built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    entries: Vec<(String, Value)>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value resolved for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in the order they were resolved.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub(crate) fn push(&mut self, name: &str, value: Value) {
        self.entries.push((name.to_string(), value));
    }
}

impl<'a> FromIterator<(&'a str, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (&'a str, Value)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(n, v)| (n.to_string(), v))
                .collect(),
        }
    }
}
