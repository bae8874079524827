//! Field type tags and per-tag configuration payloads.
//!
//! A `FieldConfig` is attached to exactly one schema field and carries the
//! properties that influence value encoding (select option sets, number
//! precision, duration display format, ...). Tags without meaningful config
//! use `FieldConfig::None`.

use serde::{Deserialize, Serialize};

/// The various types a table field can have. Immutable once assigned to a
/// schema field. Wire names follow the service's snake_case tags.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FieldTypeTag {
    Text,
    LongText,
    Number,
    Rating,
    Boolean,
    Date,
    Duration,
    SingleSelect,
    MultipleSelect,
    LinkRow,
    File,
    MultipleCollaborators,
    Email,
    Url,
    PhoneNumber,
    /// Write-only: the server never returns the stored value.
    Password,
    Formula,
    Rollup,
    Lookup,
    Uuid,
    Autonumber,
    CreatedOn,
    CreatedBy,
    LastModified,
    LastModifiedBy,
}

impl FieldTypeTag {
    /// Server-computed tags that reject any write attempt.
    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            FieldTypeTag::Formula
                | FieldTypeTag::Rollup
                | FieldTypeTag::Lookup
                | FieldTypeTag::Uuid
                | FieldTypeTag::Autonumber
                | FieldTypeTag::CreatedOn
                | FieldTypeTag::CreatedBy
                | FieldTypeTag::LastModified
                | FieldTypeTag::LastModifiedBy
        )
    }

    /// Write-only tags: decoding always yields the opaque redacted marker.
    pub fn is_write_only(self) -> bool {
        matches!(self, FieldTypeTag::Password)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldTypeTag::Text => "text",
            FieldTypeTag::LongText => "long_text",
            FieldTypeTag::Number => "number",
            FieldTypeTag::Rating => "rating",
            FieldTypeTag::Boolean => "boolean",
            FieldTypeTag::Date => "date",
            FieldTypeTag::Duration => "duration",
            FieldTypeTag::SingleSelect => "single_select",
            FieldTypeTag::MultipleSelect => "multiple_select",
            FieldTypeTag::LinkRow => "link_row",
            FieldTypeTag::File => "file",
            FieldTypeTag::MultipleCollaborators => "multiple_collaborators",
            FieldTypeTag::Email => "email",
            FieldTypeTag::Url => "url",
            FieldTypeTag::PhoneNumber => "phone_number",
            FieldTypeTag::Password => "password",
            FieldTypeTag::Formula => "formula",
            FieldTypeTag::Rollup => "rollup",
            FieldTypeTag::Lookup => "lookup",
            FieldTypeTag::Uuid => "uuid",
            FieldTypeTag::Autonumber => "autonumber",
            FieldTypeTag::CreatedOn => "created_on",
            FieldTypeTag::CreatedBy => "created_by",
            FieldTypeTag::LastModified => "last_modified",
            FieldTypeTag::LastModifiedBy => "last_modified_by",
        }
    }
}

/// One selectable option of a single or multiple select field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Server-assigned option id. Unset for options declared locally before
    /// the field exists remotely.
    #[serde(default)]
    pub id: Option<u64>,
    pub value: String,
    /// Display color, assigned by the server.
    #[serde(default)]
    pub color: Option<String>,
}

impl SelectOption {
    pub fn new(id: u64, value: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            value: value.into(),
            color: None,
        }
    }
}

/// Style of rating symbols.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RatingStyle {
    Star,
    Heart,
    ThumbsUp,
    Flag,
    Smile,
}

/// Display formats for duration fields. The format bounds the finest time
/// unit a value may carry.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationFormat {
    #[serde(rename = "h:mm")]
    HoursMinutes,
    #[serde(rename = "h:mm:ss")]
    HoursMinutesSeconds,
    #[serde(rename = "h:mm:ss.s")]
    HoursMinutesSecondsDeciseconds,
    #[serde(rename = "h:mm:ss.ss")]
    HoursMinutesSecondsCentiseconds,
    #[serde(rename = "h:mm:ss.sss")]
    HoursMinutesSecondsMilliseconds,
    #[serde(rename = "d h")]
    DaysHours,
    #[serde(rename = "d h:mm")]
    DaysHoursMinutes,
    #[serde(rename = "d h:mm:ss")]
    DaysHoursMinutesSeconds,
}

impl DurationFormat {
    /// Finest representable unit in milliseconds. A value is in-granularity
    /// when it is a whole multiple of this step.
    pub fn step_millis(self) -> i64 {
        match self {
            DurationFormat::DaysHours => 3_600_000,
            DurationFormat::HoursMinutes | DurationFormat::DaysHoursMinutes => 60_000,
            DurationFormat::HoursMinutesSeconds | DurationFormat::DaysHoursMinutesSeconds => 1_000,
            DurationFormat::HoursMinutesSecondsDeciseconds => 100,
            DurationFormat::HoursMinutesSecondsCentiseconds => 10,
            DurationFormat::HoursMinutesSecondsMilliseconds => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DurationFormat::HoursMinutes => "h:mm",
            DurationFormat::HoursMinutesSeconds => "h:mm:ss",
            DurationFormat::HoursMinutesSecondsDeciseconds => "h:mm:ss.s",
            DurationFormat::HoursMinutesSecondsCentiseconds => "h:mm:ss.ss",
            DurationFormat::HoursMinutesSecondsMilliseconds => "h:mm:ss.sss",
            DurationFormat::DaysHours => "d h",
            DurationFormat::DaysHoursMinutes => "d h:mm",
            DurationFormat::DaysHoursMinutesSeconds => "d h:mm:ss",
        }
    }
}

/// Per-tag configuration attached to a schema field.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldConfig {
    /// For tags without configurable behavior.
    #[default]
    None,
    Text {
        default: String,
    },
    LongText {
        rich_text: bool,
    },
    Number {
        /// Digits allowed after the decimal point.
        decimal_places: u8,
        /// Whether negative values are allowed.
        negative: bool,
    },
    Rating {
        max_value: u8,
        style: RatingStyle,
    },
    Date {
        include_time: bool,
    },
    Duration {
        format: DurationFormat,
    },
    SingleSelect {
        options: Vec<SelectOption>,
    },
    MultipleSelect {
        options: Vec<SelectOption>,
    },
    LinkRow {
        /// Id of the linked table, when known.
        table_id: Option<u64>,
    },
}
