//! Bidirectional conversion between typed field values and their wire
//! representation.
//!
//! One `FieldCodec` variant is selected per schema field at construction
//! time, so no runtime type inspection happens on the encode/decode path.
//! Adding a field type means adding one tag variant and one codec arm.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::{json, Value as JsonValue};

use crate::domain::config::{DurationFormat, FieldConfig, FieldTypeTag, SelectOption};
use crate::domain::field::{
    Attachment, DateTimeValue, LinkValue, NumberValue, RowLink, SelectRef, UserRef, Value,
};
use crate::error::{GridError, GridResult};

/// Per-field value codec, carrying the slice of configuration it needs.
///
/// `decode(encode(v)) == v` holds for every two-way tag; password is
/// encode-only (decode yields `Value::Redacted`) and the server-computed
/// tags are decode-only (encode is a `WriteToReadOnlyField` error).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldCodec {
    Text { field: String },
    Number {
        field: String,
        decimal_places: u8,
        negative: bool,
    },
    Rating { field: String, max_value: u8 },
    Boolean { field: String },
    Date { field: String, include_time: bool },
    Duration {
        field: String,
        format: DurationFormat,
    },
    SingleSelect {
        field: String,
        options: Vec<SelectOption>,
    },
    MultipleSelect {
        field: String,
        options: Vec<SelectOption>,
    },
    LinkRow { field: String },
    File { field: String },
    Collaborators { field: String },
    Password { field: String },
    /// All server-computed tags; the inner tag picks the decoded shape.
    ReadOnly { field: String, tag: FieldTypeTag },
}

impl FieldCodec {
    /// Selects the codec for a field once, at schema construction time.
    pub fn new(field: &str, tag: FieldTypeTag, config: &FieldConfig) -> Self {
        let field = field.to_string();
        if tag.is_read_only() {
            return FieldCodec::ReadOnly { field, tag };
        }
        match tag {
            FieldTypeTag::Text
            | FieldTypeTag::LongText
            | FieldTypeTag::Email
            | FieldTypeTag::Url
            | FieldTypeTag::PhoneNumber => FieldCodec::Text { field },
            FieldTypeTag::Number => {
                let (decimal_places, negative) = match config {
                    FieldConfig::Number {
                        decimal_places,
                        negative,
                    } => (*decimal_places, *negative),
                    _ => (0, true),
                };
                FieldCodec::Number {
                    field,
                    decimal_places,
                    negative,
                }
            }
            FieldTypeTag::Rating => {
                let max_value = match config {
                    FieldConfig::Rating { max_value, .. } => *max_value,
                    _ => 5,
                };
                FieldCodec::Rating { field, max_value }
            }
            FieldTypeTag::Boolean => FieldCodec::Boolean { field },
            FieldTypeTag::Date => {
                let include_time = match config {
                    FieldConfig::Date { include_time } => *include_time,
                    _ => false,
                };
                FieldCodec::Date {
                    field,
                    include_time,
                }
            }
            FieldTypeTag::Duration => {
                let format = match config {
                    FieldConfig::Duration { format } => *format,
                    _ => DurationFormat::HoursMinutesSeconds,
                };
                FieldCodec::Duration { field, format }
            }
            FieldTypeTag::SingleSelect => FieldCodec::SingleSelect {
                field,
                options: select_options(config),
            },
            FieldTypeTag::MultipleSelect => FieldCodec::MultipleSelect {
                field,
                options: select_options(config),
            },
            FieldTypeTag::LinkRow => FieldCodec::LinkRow { field },
            FieldTypeTag::File => FieldCodec::File { field },
            FieldTypeTag::MultipleCollaborators => FieldCodec::Collaborators { field },
            FieldTypeTag::Password => FieldCodec::Password { field },
            // Read-only tags are handled above.
            _ => FieldCodec::ReadOnly { field, tag },
        }
    }

    fn field(&self) -> &str {
        match self {
            FieldCodec::Text { field }
            | FieldCodec::Number { field, .. }
            | FieldCodec::Rating { field, .. }
            | FieldCodec::Boolean { field }
            | FieldCodec::Date { field, .. }
            | FieldCodec::Duration { field, .. }
            | FieldCodec::SingleSelect { field, .. }
            | FieldCodec::MultipleSelect { field, .. }
            | FieldCodec::LinkRow { field }
            | FieldCodec::File { field }
            | FieldCodec::Collaborators { field }
            | FieldCodec::Password { field }
            | FieldCodec::ReadOnly { field, .. } => field,
        }
    }

    fn mismatch(&self, expected: &'static str, got: &Value) -> GridError {
        GridError::ValueTypeMismatch {
            field: self.field().to_string(),
            expected,
            got: got.kind(),
        }
    }

    fn malformed(&self, detail: impl Into<String>) -> GridError {
        GridError::MalformedValue {
            field: self.field().to_string(),
            detail: detail.into(),
        }
    }

    /// Encodes a typed value into its wire representation. All validation
    /// happens here, before any request is assembled.
    pub fn encode(&self, value: &Value) -> GridResult<JsonValue> {
        if let FieldCodec::ReadOnly { field, tag } = self {
            return Err(GridError::WriteToReadOnlyField {
                field: field.clone(),
                tag: tag.as_str(),
            });
        }
        if value.is_empty() {
            return Ok(JsonValue::Null);
        }
        match self {
            FieldCodec::Text { .. } => match value {
                Value::Text(s) => Ok(JsonValue::String(s.clone())),
                other => Err(self.mismatch("text", other)),
            },
            FieldCodec::Number {
                field,
                decimal_places,
                negative,
            } => match value {
                Value::Number(n) => {
                    if !n.is_well_formed() {
                        return Err(self.malformed(format!("'{}' is not a decimal literal", n.as_str())));
                    }
                    if n.is_negative() && !negative {
                        return Err(self.malformed("negative values are not allowed"));
                    }
                    let actual = n.fractional_digits();
                    if actual > *decimal_places as usize {
                        return Err(GridError::PrecisionExceeded {
                            field: field.clone(),
                            allowed: *decimal_places,
                            value: n.as_str().to_string(),
                            actual,
                        });
                    }
                    Ok(JsonValue::String(n.as_str().to_string()))
                }
                other => Err(self.mismatch("number", other)),
            },
            FieldCodec::Rating { max_value, .. } => match value {
                Value::Rating(r) => {
                    if *r > *max_value {
                        return Err(self.malformed(format!(
                            "rating {} is above the configured maximum of {}",
                            r, max_value
                        )));
                    }
                    Ok(json!(*r))
                }
                other => Err(self.mismatch("rating", other)),
            },
            FieldCodec::Boolean { .. } => match value {
                Value::Boolean(b) => Ok(JsonValue::Bool(*b)),
                other => Err(self.mismatch("boolean", other)),
            },
            FieldCodec::Date { include_time, .. } => match (value, include_time) {
                (Value::Date(DateTimeValue::Date(d)), false) => {
                    Ok(JsonValue::String(d.format("%Y-%m-%d").to_string()))
                }
                (Value::Date(DateTimeValue::DateTime(dt)), true) => {
                    Ok(JsonValue::String(dt.to_rfc3339()))
                }
                (Value::Date(_), _) => Err(self.malformed(if *include_time {
                    "field includes a time component, supply a date-time"
                } else {
                    "field has no time component, supply a plain date"
                })),
                (other, _) => Err(self.mismatch("date", other)),
            },
            FieldCodec::Duration { field, format } => match value {
                Value::Duration(d) => {
                    let text = format_iso8601_duration(*d);
                    if d.num_milliseconds() % format.step_millis() != 0 {
                        return Err(GridError::GranularityViolation {
                            field: field.clone(),
                            format: format.as_str(),
                            value: text,
                        });
                    }
                    Ok(JsonValue::String(text))
                }
                other => Err(self.mismatch("duration", other)),
            },
            FieldCodec::SingleSelect { options, .. } => match value {
                Value::Select(entry) => self.encode_select_entry(entry, options),
                other => Err(self.mismatch("select", other)),
            },
            FieldCodec::MultipleSelect { options, .. } => match value {
                Value::MultiSelect(entries) => entries
                    .iter()
                    .map(|e| self.encode_select_entry(e, options))
                    .collect::<GridResult<Vec<_>>>()
                    .map(JsonValue::Array),
                other => Err(self.mismatch("multi-select", other)),
            },
            FieldCodec::LinkRow { field } => match value {
                Value::Link(link) => link
                    .links()
                    .iter()
                    .map(|entry| {
                        if let Some(id) = entry.id {
                            Ok(json!(id))
                        } else if let Some(key) = &entry.value {
                            Ok(JsonValue::String(key.clone()))
                        } else {
                            Err(GridError::BlankLinkReference {
                                field: field.clone(),
                            })
                        }
                    })
                    .collect::<GridResult<Vec<_>>>()
                    .map(JsonValue::Array),
                other => Err(self.mismatch("link", other)),
            },
            FieldCodec::File { .. } => match value {
                Value::Files(files) => Ok(serde_json::to_value(files)?),
                other => Err(self.mismatch("files", other)),
            },
            FieldCodec::Collaborators { .. } => match value {
                Value::Collaborators(users) => users
                    .iter()
                    .map(|u| match u.id {
                        Some(id) => Ok(json!({ "id": id })),
                        None => Err(self.malformed("collaborator entries are written by user id")),
                    })
                    .collect::<GridResult<Vec<_>>>()
                    .map(JsonValue::Array),
                other => Err(self.mismatch("collaborators", other)),
            },
            FieldCodec::Password { .. } => match value {
                Value::Password(secret) => Ok(JsonValue::String(secret.clone())),
                other => Err(self.mismatch("password", other)),
            },
            FieldCodec::ReadOnly { .. } => unreachable!("handled above"),
        }
    }

    fn encode_select_entry(
        &self,
        entry: &SelectRef,
        options: &[SelectOption],
    ) -> GridResult<JsonValue> {
        if let Some(id) = entry.id {
            if options.iter().any(|o| o.id == Some(id)) {
                return Ok(json!(id));
            }
            return Err(GridError::UnknownOption {
                field: self.field().to_string(),
                option: id.to_string(),
            });
        }
        if let Some(value) = &entry.value {
            if options.iter().any(|o| &o.value == value) {
                return Ok(JsonValue::String(value.clone()));
            }
            return Err(GridError::UnknownOption {
                field: self.field().to_string(),
                option: value.clone(),
            });
        }
        Err(self.malformed("select entry has neither an id nor a value"))
    }

    /// Decodes a wire value into its typed representation.
    pub fn decode(&self, wire: &JsonValue) -> GridResult<Value> {
        if let FieldCodec::Password { .. } = self {
            // The stored secret is never returned by the server.
            return Ok(Value::Redacted);
        }
        if wire.is_null() {
            return Ok(Value::Empty);
        }
        match self {
            FieldCodec::Text { .. } => match wire {
                JsonValue::String(s) => Ok(Value::Text(s.clone())),
                _ => Err(self.malformed("expected a string")),
            },
            FieldCodec::Number { .. } => match wire {
                JsonValue::String(s) => {
                    let n = NumberValue::new(s.clone());
                    if !n.is_well_formed() {
                        return Err(self.malformed(format!("'{}' is not a decimal literal", s)));
                    }
                    Ok(Value::Number(n))
                }
                JsonValue::Number(n) => Ok(Value::Number(NumberValue::new(n.to_string()))),
                _ => Err(self.malformed("expected a number")),
            },
            FieldCodec::Rating { .. } => wire
                .as_u64()
                .map(|r| Value::Rating(r as u8))
                .ok_or_else(|| self.malformed("expected an integer rating")),
            FieldCodec::Boolean { .. } => wire
                .as_bool()
                .map(Value::Boolean)
                .ok_or_else(|| self.malformed("expected a boolean")),
            FieldCodec::Date { include_time, .. } => {
                let text = wire
                    .as_str()
                    .ok_or_else(|| self.malformed("expected an ISO-8601 date string"))?;
                if *include_time {
                    let dt = DateTime::parse_from_rfc3339(text)
                        .map_err(|e| self.malformed(format!("'{}': {}", text, e)))?;
                    Ok(Value::Date(DateTimeValue::DateTime(dt.with_timezone(&Utc))))
                } else {
                    let d = NaiveDate::parse_from_str(text, "%Y-%m-%d")
                        .map_err(|e| self.malformed(format!("'{}': {}", text, e)))?;
                    Ok(Value::Date(DateTimeValue::Date(d)))
                }
            }
            FieldCodec::Duration { .. } => match wire {
                JsonValue::String(s) => parse_iso8601_duration(s)
                    .map(Value::Duration)
                    .ok_or_else(|| self.malformed(format!("'{}' is not an ISO-8601 duration", s))),
                // Some endpoints report durations as raw seconds.
                JsonValue::Number(n) => n
                    .as_f64()
                    .map(|secs| Value::Duration(Duration::milliseconds((secs * 1000.0) as i64)))
                    .ok_or_else(|| self.malformed("expected a duration")),
                _ => Err(self.malformed("expected a duration")),
            },
            FieldCodec::SingleSelect { .. } => self.decode_select_entry(wire).map(Value::Select),
            FieldCodec::MultipleSelect { .. } => match wire {
                JsonValue::Array(items) => items
                    .iter()
                    .map(|item| self.decode_select_entry(item))
                    .collect::<GridResult<Vec<_>>>()
                    .map(Value::MultiSelect),
                _ => Err(self.malformed("expected an array of select entries")),
            },
            FieldCodec::LinkRow { .. } => match wire {
                JsonValue::Array(items) => {
                    let mut links = Vec::with_capacity(items.len());
                    for item in items {
                        links.push(RowLink {
                            id: item.get("id").and_then(JsonValue::as_u64),
                            value: item
                                .get("value")
                                .and_then(JsonValue::as_str)
                                .map(str::to_string),
                        });
                    }
                    Ok(Value::Link(LinkValue::new(links)))
                }
                _ => Err(self.malformed("expected an array of row links")),
            },
            FieldCodec::File { .. } => {
                let files: Vec<Attachment> = serde_json::from_value(wire.clone())
                    .map_err(|e| self.malformed(format!("attachment list: {}", e)))?;
                Ok(Value::Files(files))
            }
            FieldCodec::Collaborators { .. } => {
                let users: Vec<UserRef> = serde_json::from_value(wire.clone())
                    .map_err(|e| self.malformed(format!("collaborator list: {}", e)))?;
                Ok(Value::Collaborators(users))
            }
            FieldCodec::Password { .. } => unreachable!("handled above"),
            FieldCodec::ReadOnly { tag, .. } => self.decode_read_only(*tag, wire),
        }
    }

    fn decode_select_entry(&self, wire: &JsonValue) -> GridResult<SelectRef> {
        match wire {
            JsonValue::Object(map) => Ok(SelectRef {
                id: map.get("id").and_then(JsonValue::as_u64),
                value: map
                    .get("value")
                    .and_then(JsonValue::as_str)
                    .map(str::to_string),
                color: map
                    .get("color")
                    .and_then(JsonValue::as_str)
                    .map(str::to_string),
            }),
            _ => Err(self.malformed("expected a select entry object")),
        }
    }

    fn decode_read_only(&self, tag: FieldTypeTag, wire: &JsonValue) -> GridResult<Value> {
        match tag {
            FieldTypeTag::Formula | FieldTypeTag::Rollup | FieldTypeTag::Lookup => {
                Ok(Value::Json(wire.clone()))
            }
            FieldTypeTag::Uuid => wire
                .as_str()
                .map(|s| Value::Uuid(s.to_string()))
                .ok_or_else(|| self.malformed("expected a UUID string")),
            FieldTypeTag::Autonumber => wire
                .as_i64()
                .map(Value::Integer)
                .ok_or_else(|| self.malformed("expected an integer")),
            FieldTypeTag::CreatedOn | FieldTypeTag::LastModified => {
                let text = wire
                    .as_str()
                    .ok_or_else(|| self.malformed("expected a date-time string"))?;
                let dt = DateTime::parse_from_rfc3339(text)
                    .map_err(|e| self.malformed(format!("'{}': {}", text, e)))?;
                Ok(Value::Date(DateTimeValue::DateTime(dt.with_timezone(&Utc))))
            }
            FieldTypeTag::CreatedBy | FieldTypeTag::LastModifiedBy => {
                let user: UserRef = serde_json::from_value(wire.clone())
                    .map_err(|e| self.malformed(format!("user reference: {}", e)))?;
                Ok(Value::User(user))
            }
            other => Err(self.malformed(format!("tag '{}' is not read-only", other.as_str()))),
        }
    }
}

fn select_options(config: &FieldConfig) -> Vec<SelectOption> {
    match config {
        FieldConfig::SingleSelect { options } | FieldConfig::MultipleSelect { options } => {
            options.clone()
        }
        _ => Vec::new(),
    }
}

/// Formats a duration as ISO-8601 text, e.g. `PT1H30M`, `PT2M3.5S`.
pub fn format_iso8601_duration(d: Duration) -> String {
    let total_ms = d.num_milliseconds();
    let mut out = String::new();
    if total_ms < 0 {
        out.push('-');
    }
    out.push_str("PT");
    let ms_abs = total_ms.abs();
    let hours = ms_abs / 3_600_000;
    let minutes = (ms_abs % 3_600_000) / 60_000;
    let seconds = (ms_abs % 60_000) / 1_000;
    let millis = ms_abs % 1_000;
    if hours > 0 {
        out.push_str(&format!("{}H", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}M", minutes));
    }
    if millis > 0 {
        let frac = format!("{:03}", millis);
        out.push_str(&format!("{}.{}S", seconds, frac.trim_end_matches('0')));
    } else if seconds > 0 || (hours == 0 && minutes == 0) {
        out.push_str(&format!("{}S", seconds));
    }
    out
}

/// Parses ISO-8601 duration text (`PnDTnHnMn.nS` subset). Returns `None`
/// for malformed input.
pub fn parse_iso8601_duration(text: &str) -> Option<Duration> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let rest = rest.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, t),
        None => (rest, ""),
    };

    let mut total_ms: i64 = 0;
    let mut number = String::new();
    for c in date_part.chars() {
        match c {
            '0'..='9' => number.push(c),
            'D' => {
                let days: i64 = number.parse().ok()?;
                total_ms += days * 86_400_000;
                number.clear();
            }
            _ => return None,
        }
    }
    if !number.is_empty() {
        return None;
    }
    for c in time_part.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            'H' => {
                let hours: i64 = number.parse().ok()?;
                total_ms += hours * 3_600_000;
                number.clear();
            }
            'M' => {
                let minutes: i64 = number.parse().ok()?;
                total_ms += minutes * 60_000;
                number.clear();
            }
            'S' => {
                let seconds: f64 = number.parse().ok()?;
                total_ms += (seconds * 1000.0).round() as i64;
                number.clear();
            }
            _ => return None,
        }
    }
    if !number.is_empty() {
        return None;
    }
    Some(Duration::milliseconds(if negative {
        -total_ms
    } else {
        total_ms
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn text_codec() -> FieldCodec {
        FieldCodec::new("Name", FieldTypeTag::Text, &FieldConfig::None)
    }

    fn number_codec(decimal_places: u8) -> FieldCodec {
        FieldCodec::new(
            "Age",
            FieldTypeTag::Number,
            &FieldConfig::Number {
                decimal_places,
                negative: false,
            },
        )
    }

    fn select_codec(tag: FieldTypeTag) -> FieldCodec {
        let options = vec![
            SelectOption::new(1, "Fiction"),
            SelectOption::new(2, "Education"),
            SelectOption::new(3, "Mystery"),
        ];
        let config = match tag {
            FieldTypeTag::SingleSelect => FieldConfig::SingleSelect { options },
            _ => FieldConfig::MultipleSelect { options },
        };
        FieldCodec::new("Genre", tag, &config)
    }

    #[test]
    fn text_round_trip() {
        let codec = text_codec();
        let value = Value::text("The Great Adventure");
        let wire = codec.encode(&value).unwrap();
        assert_eq!(codec.decode(&wire).unwrap(), value);
    }

    #[test]
    fn empty_encodes_to_null_and_back() {
        let codec = text_codec();
        let wire = codec.encode(&Value::Empty).unwrap();
        assert!(wire.is_null());
        assert_eq!(codec.decode(&wire).unwrap(), Value::Empty);
    }

    #[test]
    fn number_round_trip_at_max_precision() {
        let codec = number_codec(2);
        let value = Value::number("12.34");
        let wire = codec.encode(&value).unwrap();
        assert_eq!(wire, JsonValue::String("12.34".into()));
        assert_eq!(codec.decode(&wire).unwrap(), value);
    }

    #[test]
    fn number_precision_exceeded_is_rejected_not_rounded() {
        let codec = number_codec(1);
        let err = codec.encode(&Value::number("12.34")).unwrap_err();
        match err {
            GridError::PrecisionExceeded {
                allowed, actual, ..
            } => {
                assert_eq!(allowed, 1);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn number_negative_rejected_when_not_allowed() {
        let codec = number_codec(0);
        assert!(codec.encode(&Value::number("-4")).is_err());
    }

    #[test]
    fn number_decode_accepts_json_numbers() {
        let codec = number_codec(0);
        assert_eq!(codec.decode(&json!(29)).unwrap(), Value::number("29"));
    }

    #[test]
    fn boolean_round_trip() {
        let codec = FieldCodec::new("NDA Signed", FieldTypeTag::Boolean, &FieldConfig::None);
        for v in [true, false] {
            let wire = codec.encode(&Value::Boolean(v)).unwrap();
            assert_eq!(codec.decode(&wire).unwrap(), Value::Boolean(v));
        }
    }

    #[test]
    fn date_round_trip_without_time() {
        let codec = FieldCodec::new(
            "Published Date",
            FieldTypeTag::Date,
            &FieldConfig::Date {
                include_time: false,
            },
        );
        let value = Value::Date(DateTimeValue::Date(
            NaiveDate::from_ymd_opt(2024, 7, 17).unwrap(),
        ));
        let wire = codec.encode(&value).unwrap();
        assert_eq!(wire, JsonValue::String("2024-07-17".into()));
        assert_eq!(codec.decode(&wire).unwrap(), value);
    }

    #[test]
    fn date_round_trip_with_time() {
        let codec = FieldCodec::new(
            "Employed since",
            FieldTypeTag::Date,
            &FieldConfig::Date { include_time: true },
        );
        let value = Value::Date(DateTimeValue::DateTime(
            Utc.with_ymd_and_hms(2024, 7, 17, 9, 30, 0).unwrap(),
        ));
        let wire = codec.encode(&value).unwrap();
        assert_eq!(codec.decode(&wire).unwrap(), value);
    }

    #[test]
    fn date_shape_must_match_config() {
        let codec = FieldCodec::new(
            "Published Date",
            FieldTypeTag::Date,
            &FieldConfig::Date {
                include_time: false,
            },
        );
        let value = Value::Date(DateTimeValue::DateTime(Utc::now()));
        assert!(codec.encode(&value).is_err());
    }

    #[test]
    fn duration_round_trip() {
        let codec = FieldCodec::new(
            "Reading Duration",
            FieldTypeTag::Duration,
            &FieldConfig::Duration {
                format: DurationFormat::HoursMinutesSeconds,
            },
        );
        let value = Value::Duration(Duration::seconds(8 * 3600 + 15 * 60 + 42));
        let wire = codec.encode(&value).unwrap();
        assert_eq!(wire, JsonValue::String("PT8H15M42S".into()));
        assert_eq!(codec.decode(&wire).unwrap(), value);
    }

    #[test]
    fn duration_granularity_violation() {
        let codec = FieldCodec::new(
            "Workhours per day",
            FieldTypeTag::Duration,
            &FieldConfig::Duration {
                format: DurationFormat::HoursMinutes,
            },
        );
        // 90 seconds is not a whole number of minutes.
        let err = codec.encode(&Value::Duration(Duration::seconds(90))).unwrap_err();
        assert!(matches!(err, GridError::GranularityViolation { .. }));
        // A whole number of minutes is fine.
        assert!(codec.encode(&Value::Duration(Duration::minutes(90))).is_ok());
    }

    #[test]
    fn duration_subsecond_formats() {
        let codec = FieldCodec::new(
            "Lap",
            FieldTypeTag::Duration,
            &FieldConfig::Duration {
                format: DurationFormat::HoursMinutesSecondsMilliseconds,
            },
        );
        let value = Value::Duration(Duration::milliseconds(90_500));
        let wire = codec.encode(&value).unwrap();
        assert_eq!(wire, JsonValue::String("PT1M30.5S".into()));
        assert_eq!(codec.decode(&wire).unwrap(), value);
    }

    #[test]
    fn single_select_encodes_known_id() {
        let codec = select_codec(FieldTypeTag::SingleSelect);
        let wire = codec.encode(&Value::Select(SelectRef::by_id(2))).unwrap();
        assert_eq!(wire, json!(2));
    }

    #[test]
    fn single_select_unknown_option_rejected() {
        let codec = select_codec(FieldTypeTag::SingleSelect);
        let err = codec
            .encode(&Value::Select(SelectRef::by_value("Romance")))
            .unwrap_err();
        assert!(matches!(err, GridError::UnknownOption { .. }));
    }

    #[test]
    fn single_select_read_then_write_uses_id() {
        let codec = select_codec(FieldTypeTag::SingleSelect);
        let decoded = codec
            .decode(&json!({"id": 3, "value": "Mystery", "color": "dark-red"}))
            .unwrap();
        assert_eq!(codec.encode(&decoded).unwrap(), json!(3));
    }

    #[test]
    fn multi_select_preserves_server_order() {
        let codec = select_codec(FieldTypeTag::MultipleSelect);
        let decoded = codec
            .decode(&json!([
                {"id": 3, "value": "Mystery"},
                {"id": 1, "value": "Fiction"},
            ]))
            .unwrap();
        match &decoded {
            Value::MultiSelect(entries) => {
                assert_eq!(entries[0].id, Some(3));
                assert_eq!(entries[1].id, Some(1));
            }
            other => panic!("unexpected value: {other:?}"),
        }
        assert_eq!(codec.encode(&decoded).unwrap(), json!([3, 1]));
    }

    #[test]
    fn multi_select_empty_and_full() {
        let codec = select_codec(FieldTypeTag::MultipleSelect);
        assert_eq!(
            codec.encode(&Value::MultiSelect(Vec::new())).unwrap(),
            json!([])
        );
        let all = Value::MultiSelect(vec![
            SelectRef::by_id(1),
            SelectRef::by_id(2),
            SelectRef::by_id(3),
        ]);
        assert_eq!(codec.encode(&all).unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn link_encode_prefers_id_over_display_value() {
        let codec = FieldCodec::new("Author", FieldTypeTag::LinkRow, &FieldConfig::None);
        let value = Value::Link(LinkValue::new(vec![
            RowLink {
                id: Some(4),
                value: Some("John Doe".into()),
            },
            RowLink {
                id: None,
                value: Some("Jane Smith".into()),
            },
        ]));
        assert_eq!(codec.encode(&value).unwrap(), json!([4, "Jane Smith"]));
    }

    #[test]
    fn link_blank_entry_rejected() {
        let codec = FieldCodec::new("Author", FieldTypeTag::LinkRow, &FieldConfig::None);
        let value = Value::Link(LinkValue::new(vec![RowLink {
            id: None,
            value: None,
        }]));
        assert!(matches!(
            codec.encode(&value).unwrap_err(),
            GridError::BlankLinkReference { .. }
        ));
    }

    #[test]
    fn file_round_trip_empty_and_full() {
        let codec = FieldCodec::new("Cover", FieldTypeTag::File, &FieldConfig::None);
        let empty = Value::Files(Vec::new());
        assert_eq!(codec.decode(&codec.encode(&empty).unwrap()).unwrap(), empty);

        let full = Value::Files(vec![Attachment {
            name: "x7f3_cover.png".into(),
            url: Some("https://files.example.com/x7f3_cover.png".into()),
            mime_type: Some("image/png".into()),
            size: Some(48_213),
            is_image: Some(true),
            uploaded_at: None,
            original_name: Some("cover.png".into()),
        }]);
        assert_eq!(codec.decode(&codec.encode(&full).unwrap()).unwrap(), full);
    }

    #[test]
    fn file_bare_name_reference_encodes() {
        let codec = FieldCodec::new("Cover", FieldTypeTag::File, &FieldConfig::None);
        let wire = codec
            .encode(&Value::Files(vec![Attachment::by_name("x7f3_cover.png")]))
            .unwrap();
        assert_eq!(wire, json!([{"name": "x7f3_cover.png"}]));
    }

    #[test]
    fn password_is_encode_only() {
        let codec = FieldCodec::new("Secret", FieldTypeTag::Password, &FieldConfig::None);
        let wire = codec.encode(&Value::Password("hunter2".into())).unwrap();
        assert_eq!(wire, JsonValue::String("hunter2".into()));
        // Whatever comes back decodes to the opaque marker.
        assert_eq!(codec.decode(&json!(true)).unwrap(), Value::Redacted);
        assert_eq!(codec.decode(&JsonValue::Null).unwrap(), Value::Redacted);
    }

    #[test]
    fn every_read_only_tag_rejects_writes() {
        let tags = [
            FieldTypeTag::Formula,
            FieldTypeTag::Rollup,
            FieldTypeTag::Lookup,
            FieldTypeTag::Uuid,
            FieldTypeTag::Autonumber,
            FieldTypeTag::CreatedOn,
            FieldTypeTag::CreatedBy,
            FieldTypeTag::LastModified,
            FieldTypeTag::LastModifiedBy,
        ];
        for tag in tags {
            let codec = FieldCodec::new("Computed", tag, &FieldConfig::None);
            let err = codec.encode(&Value::text("anything")).unwrap_err();
            assert!(
                matches!(err, GridError::WriteToReadOnlyField { .. }),
                "tag {} must reject writes",
                tag.as_str()
            );
            // Even clearing the field is a write.
            assert!(codec.encode(&Value::Empty).is_err());
        }
    }

    #[test]
    fn read_only_decodes_by_tag() {
        let uuid = FieldCodec::new("UUID", FieldTypeTag::Uuid, &FieldConfig::None);
        assert_eq!(
            uuid.decode(&json!("7b1df2e6-47c6-4f37-a6eb-23e95ba2e0e5")).unwrap(),
            Value::Uuid("7b1df2e6-47c6-4f37-a6eb-23e95ba2e0e5".into())
        );

        let auto = FieldCodec::new("No.", FieldTypeTag::Autonumber, &FieldConfig::None);
        assert_eq!(auto.decode(&json!(17)).unwrap(), Value::Integer(17));

        let by = FieldCodec::new("Created by", FieldTypeTag::CreatedBy, &FieldConfig::None);
        assert_eq!(
            by.decode(&json!({"id": 9, "name": "admin"})).unwrap(),
            Value::User(UserRef {
                id: Some(9),
                name: Some("admin".into())
            })
        );

        let formula = FieldCodec::new("Total", FieldTypeTag::Formula, &FieldConfig::None);
        assert_eq!(
            formula.decode(&json!("42.00")).unwrap(),
            Value::Json(json!("42.00"))
        );
    }

    #[test]
    fn iso8601_duration_parsing() {
        assert_eq!(
            parse_iso8601_duration("PT1H30M"),
            Some(Duration::minutes(90))
        );
        assert_eq!(
            parse_iso8601_duration("P1DT2H"),
            Some(Duration::hours(26))
        );
        assert_eq!(
            parse_iso8601_duration("PT0.5S"),
            Some(Duration::milliseconds(500))
        );
        assert_eq!(parse_iso8601_duration("PT"), Some(Duration::zero()));
        assert_eq!(parse_iso8601_duration("90 minutes"), None);
        assert_eq!(parse_iso8601_duration("P1H"), None);
    }
}
