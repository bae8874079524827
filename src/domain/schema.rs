//! Row schema declaration, table bindings, and write payloads.
//!
//! A `RowSchema` is declared once in application code and is immutable
//! afterwards. Each field owns its codec, selected at build time.

use std::collections::HashMap;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::domain::codec::FieldCodec;
use crate::domain::config::{FieldConfig, FieldTypeTag};
use crate::domain::field::{Row, TableId, Value};
use crate::error::{GridError, GridResult};

/// One declared field of a row schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    key: String,
    wire_name: String,
    tag: FieldTypeTag,
    config: FieldConfig,
    primary: bool,
    codec: FieldCodec,
}

impl SchemaField {
    /// The key application code uses to address the field.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The field name as it appears in the remote table.
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    pub fn tag(&self) -> FieldTypeTag {
        self.tag
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn codec(&self) -> &FieldCodec {
        &self.codec
    }
}

/// An ordered, immutable set of schema fields with exactly one primary
/// field and unique wire names.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSchema {
    fields: Vec<SchemaField>,
    by_key: HashMap<String, usize>,
    primary: usize,
}

impl RowSchema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder { fields: Vec::new() }
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&SchemaField> {
        self.by_key.get(key).map(|i| &self.fields[*i])
    }

    pub fn primary_field(&self) -> &SchemaField {
        &self.fields[self.primary]
    }

    /// Decodes a server row body into a typed `Row`. Fields the response
    /// does not mention are skipped.
    pub fn decode_row(&self, body: &JsonValue) -> GridResult<Row> {
        let id = body.get("id").and_then(JsonValue::as_u64);
        let mut values = HashMap::with_capacity(self.fields.len());
        for field in &self.fields {
            if let Some(wire) = body.get(field.wire_name()) {
                values.insert(field.key.clone(), field.codec.decode(wire)?);
            }
        }
        Ok(Row::from_parts(id, values))
    }
}

/// Chainable schema builder. `config()` and `primary()` apply to the most
/// recently added field.
pub struct SchemaBuilder {
    fields: Vec<(String, String, FieldTypeTag, FieldConfig, bool)>,
}

impl SchemaBuilder {
    pub fn field(
        mut self,
        key: impl Into<String>,
        wire_name: impl Into<String>,
        tag: FieldTypeTag,
    ) -> Self {
        self.fields
            .push((key.into(), wire_name.into(), tag, FieldConfig::None, false));
        self
    }

    pub fn config(mut self, config: FieldConfig) -> Self {
        if let Some(last) = self.fields.last_mut() {
            last.3 = config;
        }
        self
    }

    pub fn primary(mut self) -> Self {
        if let Some(last) = self.fields.last_mut() {
            last.4 = true;
        }
        self
    }

    pub fn build(self) -> GridResult<RowSchema> {
        let mut fields: Vec<SchemaField> = Vec::with_capacity(self.fields.len());
        let mut by_key = HashMap::new();
        let mut seen_wire: HashMap<String, ()> = HashMap::new();
        let mut primary: Option<usize> = None;

        for (index, (key, wire_name, tag, config, is_primary)) in
            self.fields.into_iter().enumerate()
        {
            if by_key.contains_key(&key) {
                return Err(GridError::DuplicateFieldKey { key });
            }
            if seen_wire.insert(wire_name.clone(), ()).is_some() {
                return Err(GridError::DuplicateWireName { wire_name });
            }
            if is_primary {
                if let Some(first) = primary {
                    return Err(GridError::MultiplePrimaryFields {
                        first: fields[first].key.clone(),
                        second: key,
                    });
                }
                primary = Some(index);
            }
            let codec = FieldCodec::new(&wire_name, tag, &config);
            by_key.insert(key.clone(), index);
            fields.push(SchemaField {
                key,
                wire_name,
                tag,
                config,
                primary: is_primary,
                codec,
            });
        }

        let primary = primary.ok_or(GridError::MissingPrimaryField)?;
        Ok(RowSchema {
            fields,
            by_key,
            primary,
        })
    }
}

/// A row schema bound to one remote table. Constructed once per logical
/// table and reused for all operations.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBinding {
    table_id: TableId,
    name: String,
    schema: RowSchema,
}

impl TableBinding {
    pub fn new(table_id: TableId, name: impl Into<String>, schema: RowSchema) -> GridResult<Self> {
        if table_id == 0 {
            return Err(GridError::InvalidTableId);
        }
        Ok(Self {
            table_id,
            name: name.into(),
            schema,
        })
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Human-readable table name, used for debugging only.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &RowSchema {
        &self.schema
    }
}

/// A write payload: an ordered mapping from declared field key to value.
///
/// A partial mapping patches only the supplied fields. `full_from_row`
/// builds a payload covering every writable schema field, with missing
/// values as explicit nulls so the service clears them — the partial/full
/// distinction is a contract, not an accident.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowValues {
    entries: Vec<(String, Value)>,
}

impl RowValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field value, replacing any earlier entry for the same key.
    pub fn set(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
        self
    }

    /// Builds a full write payload from a decoded row: every writable
    /// schema field is present, fields the row does not carry become
    /// explicit nulls. Read-only fields are skipped because writing them is
    /// always an error.
    pub fn full_from_row(schema: &RowSchema, row: &Row) -> Self {
        let mut values = Self::new();
        for field in schema.fields() {
            if field.tag().is_read_only() {
                continue;
            }
            let value = row.get(field.key()).cloned().unwrap_or(Value::Empty);
            values = values.set(field.key(), value);
        }
        values
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Encodes the payload against the schema. Unknown keys and every
    /// per-field validation fail here, before any request is sent.
    pub fn encode(&self, schema: &RowSchema) -> GridResult<JsonMap<String, JsonValue>> {
        let mut body = JsonMap::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            let field = schema
                .field(key)
                .ok_or_else(|| GridError::UnknownFieldKey { key: key.clone() })?;
            body.insert(field.wire_name().to_string(), field.codec().encode(value)?);
        }
        Ok(body)
    }
}
