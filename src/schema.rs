//! Schema: the ordered field table of a struct kind, and the engine that constructs, decodes
//! and encodes records against it.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use tracing::{debug, trace, warn};

use crate::{
    codec::{Codec, Length},
    context::Context,
    errors::{CompileError, ReadError, WriteError},
    field::{Field, FieldDefault, Hint},
    record::Record,
    value::{Value, ValueKind},
};

/// A supplied value that could not be converted to its field's declared type and was kept as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionSkipped {
    pub field: String,
    pub from: ValueKind,
    pub to: ValueKind,
}

/// A compiled struct kind: its name and fields in declaration order.
///
/// Declaration order drives decoding and encoding alike. A schema is immutable once compiled
/// and is shared (through [Arc]) by every record of its kind.
#[derive(Debug)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Compiles a list of [Field]s into a schema. Fails on empty or duplicate names.
    pub fn compile(name: impl Into<String>, fields: Vec<Field>) -> Result<Arc<Self>, CompileError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CompileError::InvalidSchemaName);
        }

        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if field.name.is_empty() || !seen.insert(field.name.as_str()) {
                return Err(CompileError::InvalidFieldName(field.name.clone()));
            }
        }

        if let Some((_, init)) = fields.split_last() {
            for field in init.iter().filter(|f| f.length().is_unbounded()) {
                warn!(
                    schema = %name,
                    field = %field.name,
                    "field consumes all remaining bytes but is not the last field"
                );
            }
        }

        Ok(Arc::new(Self { name, fields }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Encoded size when every field has a fixed length.
    pub fn fixed_size(&self) -> Option<usize> {
        self.fields.iter().try_fold(0usize, |acc, f| match f.length() {
            Length::Fixed(size) => acc.checked_add(size),
            _ => None,
        })
    }

    /// Record holding every field's default.
    pub fn default_record(self: &Arc<Self>) -> Record {
        self.construct(Vec::<(&str, Value)>::new())
    }

    /// Builds a record from `values`, falling back to each field's default.
    ///
    /// A supplied value whose kind differs from a scalar default is converted to the default's
    /// kind; if that fails the value is kept unchanged. Construction never fails. Names that
    /// match no field are ignored.
    pub fn construct<I, K>(self: &Arc<Self>, values: I) -> Record
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.construct_with(values, |_| {})
    }

    /// Like [Schema::construct], reporting every skipped coercion to `on_skip`.
    pub fn construct_with<I, K, F>(self: &Arc<Self>, values: I, mut on_skip: F) -> Record
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
        F: FnMut(&CoercionSkipped),
    {
        let mut supplied: HashMap<String, Value> =
            values.into_iter().map(|(k, v)| (k.into(), v)).collect();

        let mut out = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let value = match supplied.remove(&field.name) {
                None => field.default.value(),
                Some(value) => match &field.default {
                    FieldDefault::Scalar(default) => {
                        coerce(&self.name, &field.name, value, default.kind(), &mut on_skip)
                    }
                    FieldDefault::Codec(_) => value,
                },
            };
            out.push(value);
        }

        for name in supplied.keys() {
            debug!(schema = %self.name, field = %name, "ignoring value for undeclared field");
        }

        Record::from_parts(self.clone(), out)
    }

    /// Decodes `data` into a record. Bytes after the last field are ignored.
    pub fn parse(self: &Arc<Self>, data: &[u8]) -> Result<Record, ReadError> {
        self.parse_prefix(data).map(|(record, _)| record)
    }

    /// Decodes `data` into a record, failing if any byte is left unconsumed.
    pub fn parse_exact(self: &Arc<Self>, data: &[u8]) -> Result<Record, ReadError> {
        let (record, consumed) = self.parse_prefix(data)?;
        if consumed < data.len() {
            return Err(ReadError::TrailingBytes {
                field: String::new(),
                count: data.len() - consumed,
            });
        }

        Ok(record)
    }

    /// Decodes a record from the start of `data`, returning it with the number of bytes consumed.
    ///
    /// Fields resolve left to right. Each field's length and value may depend on the values
    /// of the fields declared before it, never after.
    pub fn parse_prefix(self: &Arc<Self>, data: &[u8]) -> Result<(Record, usize), ReadError> {
        let mut ctx = Context::new();
        let mut offset = 0;
        let mut values = Vec::with_capacity(self.fields.len());

        for field in &self.fields {
            let remaining = data.len() - offset;
            let length = field
                .length()
                .resolve(&ctx, remaining)
                .map_err(|e| e.in_field(&field.name))?;

            if length > remaining {
                return Err(ReadError::Truncated {
                    field: field.name.clone(),
                    needed: length,
                    remaining,
                });
            }

            let slice = &data[offset..offset + length];
            let value = match field.default.codec() {
                Some(codec) => codec.parse(slice, &ctx),
                None => field
                    .hint
                    .parse(slice)
                    .unwrap_or_else(|| Ok(Value::Bytes(slice.to_vec()))),
            }
            .map_err(|e| e.in_field(&field.name))?;

            trace!(schema = %self.name, field = %field.name, offset, length, "decoded field");

            offset += length;
            ctx.push(&field.name, value.clone());
            values.push((field.name.clone(), value));
        }

        Ok((self.construct(values), offset))
    }

    /// Encodes `record` field by field in declaration order.
    ///
    /// Each field is encoded by the first strategy that applies: a nested record encodes
    /// itself, then the field's codec, then the value's own byte form. Codecs see a snapshot
    /// of every field of the record. A nested record under a codec must still match the
    /// codec's length.
    pub fn build(&self, record: &Record) -> Result<Vec<u8>, WriteError> {
        let ctx: Context = record.fields().map(|(n, v)| (n, v.clone())).collect();
        let mut out = Vec::new();

        for field in &self.fields {
            let value = record
                .get(&field.name)
                .ok_or_else(|| WriteError::UnknownField(field.name.clone()))?;

            let bytes = match (value, field.default.codec()) {
                (Value::Record(nested), codec) => {
                    let bytes = nested.build().map_err(|e| e.in_field(&field.name))?;
                    if let Some(codec) = codec {
                        codec
                            .length()
                            .check(&ctx, bytes.len())
                            .map_err(|e| e.in_field(&field.name))?;
                    }
                    bytes
                }
                (value, Some(codec)) => codec
                    .build(value, &ctx)
                    .map_err(|e| e.in_field(&field.name))?,
                (value, None) => value.to_bytes().ok_or_else(|| WriteError::Unencodable {
                    field: field.name.clone(),
                    value: value.repr(),
                })?,
            };

            trace!(schema = %self.name, field = %field.name, length = bytes.len(), "encoded field");
            out.extend_from_slice(&bytes);
        }

        Ok(out)
    }
}

fn coerce<F>(schema: &str, field: &str, value: Value, target: ValueKind, on_skip: &mut F) -> Value
where
    F: FnMut(&CoercionSkipped),
{
    let from = value.kind();
    if from == target || from == ValueKind::Record {
        return value;
    }

    match value.coerce_to(target) {
        Some(coerced) => coerced,
        None => {
            debug!(
                schema,
                field,
                from = %from,
                to = %target,
                "coercion skipped, keeping supplied value"
            );
            on_skip(&CoercionSkipped {
                field: field.to_string(),
                from,
                to: target,
            });
            value
        }
    }
}

/// Ordered registration of a struct kind's fields.
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<Field>,
}

impl SchemaBuilder {
    /// Field without a codec, defaulting to `hint`'s implicit default.
    pub fn field(mut self, name: impl Into<String>, hint: Hint) -> Self {
        self.fields.push(Field::new(name, hint));
        self
    }

    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        hint: Hint,
        default: impl Into<Value>,
    ) -> Self {
        self.fields.push(Field::with_default(name, hint, default));
        self
    }

    pub fn codec(mut self, name: impl Into<String>, codec: impl Codec + 'static) -> Self {
        self.fields.push(Field::with_codec(name, codec));
        self
    }

    pub fn shared_codec(mut self, name: impl Into<String>, codec: Arc<dyn Codec>) -> Self {
        self.fields.push(Field::with_shared_codec(name, codec));
        self
    }

    pub fn push(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn compile(self) -> Result<Arc<Schema>, CompileError> {
        Schema::compile(self.name, self.fields)
    }
}
