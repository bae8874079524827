//! Typed in-memory representations of table field values.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::sync::OnceCell;

use crate::app::table_service::TableService;
use crate::error::{GridError, GridResult};

/// Row identifiers are positive integers assigned by the server.
pub type RowId = u64;
/// Table identifiers are positive integers.
pub type TableId = u64;

/// A decimal number kept as canonical text so the configured precision is
/// preserved exactly; no float rounding can occur between decode and encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberValue {
    text: String,
}

impl NumberValue {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of digits after the decimal point.
    pub fn fractional_digits(&self) -> usize {
        match self.text.split_once('.') {
            Some((_, frac)) => frac.len(),
            None => 0,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.text.starts_with('-')
    }

    /// A decimal literal: optional sign, digits, optional fraction.
    pub fn is_well_formed(&self) -> bool {
        let body = self.text.strip_prefix('-').unwrap_or(&self.text);
        if body.is_empty() {
            return false;
        }
        let mut parts = body.splitn(2, '.');
        let int_part = parts.next().unwrap_or("");
        let frac_part = parts.next();
        let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        digits(int_part) && frac_part.map(digits).unwrap_or(true)
    }
}

impl From<i64> for NumberValue {
    fn from(v: i64) -> Self {
        Self { text: v.to_string() }
    }
}

impl From<u64> for NumberValue {
    fn from(v: u64) -> Self {
        Self { text: v.to_string() }
    }
}

/// A date field value: plain date or date-time, depending on whether the
/// field is configured to include a time component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeValue {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

/// Reference to a select option, by server id or by option value. When both
/// are present (as in decoded rows) the id wins on encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectRef {
    pub id: Option<u64>,
    pub value: Option<String>,
    /// Display color as returned by the server; ignored on encode.
    pub color: Option<String>,
}

impl SelectRef {
    pub fn by_id(id: u64) -> Self {
        Self {
            id: Some(id),
            value: None,
            color: None,
        }
    }

    pub fn by_value(value: impl Into<String>) -> Self {
        Self {
            id: None,
            value: Some(value.into()),
            color: None,
        }
    }
}

/// A single linking of one row to another row in another table. A link
/// field can hold multiple of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLink {
    pub id: Option<RowId>,
    /// Denormalized display value (the linked row's primary field text).
    pub value: Option<String>,
}

impl RowLink {
    pub fn by_id(id: RowId) -> Self {
        Self {
            id: Some(id),
            value: None,
        }
    }
}

/// The decoded value of a link-to-table field: an ordered reference set
/// that can be resolved on demand through the linked table's service.
///
/// The resolution cache is scoped to this value (and therefore to the one
/// decoded row holding it); the first resolution wins and subsequent calls
/// return the memoized rows without further requests. Clones start with an
/// empty cache.
#[derive(Debug)]
pub struct LinkValue {
    links: Vec<RowLink>,
    cache: OnceCell<Vec<Row>>,
}

impl LinkValue {
    pub fn new(links: Vec<RowLink>) -> Self {
        Self {
            links,
            cache: OnceCell::new(),
        }
    }

    pub fn from_ids(ids: &[RowId]) -> Self {
        Self::new(ids.iter().map(|id| RowLink::by_id(*id)).collect())
    }

    pub fn links(&self) -> &[RowLink] {
        &self.links
    }

    /// Fetches all linked rows through the given service (one request per
    /// link), memoizing the result for this value instance. Entries without
    /// a row id cannot be resolved.
    pub async fn resolve(&self, service: &TableService) -> GridResult<&Vec<Row>> {
        self.cache
            .get_or_try_init(|| async {
                let mut rows = Vec::with_capacity(self.links.len());
                for link in &self.links {
                    let id = link.id.ok_or(GridError::LinkMissingRowId)?;
                    rows.push(service.get(id).await?);
                }
                Ok(rows)
            })
            .await
    }
}

impl Clone for LinkValue {
    fn clone(&self) -> Self {
        Self::new(self.links.clone())
    }
}

impl PartialEq for LinkValue {
    fn eq(&self, other: &Self) -> bool {
        self.links == other.links
    }
}

/// A single stored file with its metadata. Encoding accepts either a full
/// descriptor (as decoded from the server) or a bare `name` reference to an
/// already-uploaded file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Attachment {
    /// Opaque storage reference of the uploaded file.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_image: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
    /// Display name shown in the service UI and used for downloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
}

impl Attachment {
    /// A bare reference to an already-uploaded file.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            mime_type: None,
            size: None,
            is_image: None,
            uploaded_at: None,
            original_name: None,
        }
    }
}

/// A reference to a service user (collaborator fields, created-by, ...).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

impl UserRef {
    pub fn by_id(id: u64) -> Self {
        Self {
            id: Some(id),
            name: None,
        }
    }
}

/// A typed field value conforming to one field of a row schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent/cleared value; encodes to JSON null.
    Empty,
    Text(String),
    Number(NumberValue),
    Rating(u8),
    Boolean(bool),
    Date(DateTimeValue),
    Duration(Duration),
    Select(SelectRef),
    MultiSelect(Vec<SelectRef>),
    Link(LinkValue),
    Files(Vec<Attachment>),
    Collaborators(Vec<UserRef>),
    /// Single user reference (created-by / last-modified-by).
    User(UserRef),
    Uuid(String),
    /// Autonumber values.
    Integer(i64),
    /// Raw server value of formula/rollup/lookup fields, whose shape depends
    /// on the formula result type.
    Json(JsonValue),
    /// Write-only password input.
    Password(String),
    /// Opaque marker: the server never returns password contents.
    Redacted,
}

impl Value {
    pub fn text(v: impl Into<String>) -> Self {
        Value::Text(v.into())
    }

    pub fn number(v: impl Into<String>) -> Self {
        Value::Number(NumberValue::new(v))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Short name of the value kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Empty => "empty",
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::Rating(_) => "rating",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
            Value::Duration(_) => "duration",
            Value::Select(_) => "select",
            Value::MultiSelect(_) => "multi-select",
            Value::Link(_) => "link",
            Value::Files(_) => "files",
            Value::Collaborators(_) => "collaborators",
            Value::User(_) => "user",
            Value::Uuid(_) => "uuid",
            Value::Integer(_) => "integer",
            Value::Json(_) => "json",
            Value::Password(_) => "password",
            Value::Redacted => "redacted",
        }
    }
}

/// A decoded row: the server-assigned identifier plus one typed value per
/// schema field present in the response, keyed by the declared field key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub id: Option<RowId>,
    values: HashMap<String, Value>,
}

impl Row {
    pub(crate) fn from_parts(id: Option<RowId>, values: HashMap<String, Value>) -> Self {
        Self { id, values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
