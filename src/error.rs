//! Error types for the crate.

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Primary error type for all rowgrid operations.
///
/// Variants are grouped by family: configuration errors are detected when a
/// schema or binding is built, encoding errors are detected before any
/// request is sent, request errors surface remote failures verbatim. The
/// library never retries; a failed attempt is reported as-is.
#[derive(Error, Debug)]
pub enum GridError {
    // === Configuration ===
    /// A row schema must designate exactly one primary field.
    #[error("row schema declares no primary field")]
    MissingPrimaryField,

    /// More than one field was marked primary.
    #[error("row schema declares more than one primary field: '{first}' and '{second}'")]
    MultiplePrimaryFields { first: String, second: String },

    /// Two schema fields share the same declared key.
    #[error("duplicate field key '{key}' in row schema")]
    DuplicateFieldKey { key: String },

    /// Two schema fields map to the same wire name.
    #[error("duplicate wire field name '{wire_name}' in row schema")]
    DuplicateWireName { wire_name: String },

    /// A row value refers to a field key the schema does not declare.
    #[error("field key '{key}' is not declared in the row schema")]
    UnknownFieldKey { key: String },

    /// Table identifiers are positive integers.
    #[error("table id must be a positive integer")]
    InvalidTableId,

    /// A required environment variable is missing.
    #[error("environment variable {name} must be set")]
    MissingEnv { name: String },

    /// The process-wide client context can only be constructed once.
    #[error("client context was already initialized for this process")]
    AlreadyInitialized,

    // === Encoding (always detected before any I/O) ===
    /// A number value carries more fractional digits than the field allows.
    #[error("field '{field}' allows {allowed} decimal place(s) but '{value}' has {actual}")]
    PrecisionExceeded {
        field: String,
        allowed: u8,
        value: String,
        actual: usize,
    },

    /// A select entry does not exist in the field's configured option set.
    #[error("option '{option}' is not part of the configured option set of field '{field}'")]
    UnknownOption { field: String, option: String },

    /// A duration has sub-units finer than the field's display format.
    #[error("duration '{value}' has sub-units finer than the '{format}' format of field '{field}'")]
    GranularityViolation {
        field: String,
        format: &'static str,
        value: String,
    },

    /// Writing to a server-computed field is a contract violation.
    #[error("field '{field}' is read-only ({tag}) and cannot be written")]
    WriteToReadOnlyField { field: String, tag: &'static str },

    /// The supplied value does not match the field's type tag.
    #[error("field '{field}' expects a {expected} value, got {got}")]
    ValueTypeMismatch {
        field: String,
        expected: &'static str,
        got: &'static str,
    },

    /// A value could not be encoded or a wire value could not be decoded.
    #[error("field '{field}': malformed value: {detail}")]
    MalformedValue { field: String, detail: String },

    /// A link entry must carry a row id or a display value to be written.
    #[error("link entry for field '{field}' carries neither a row id nor a display value")]
    BlankLinkReference { field: String },

    /// Link resolution requires row ids; display-only entries cannot be fetched.
    #[error("cannot resolve a link entry that has no row id")]
    LinkMissingRowId,

    // === Requests ===
    /// Page sizes are bounded by the service.
    #[error("page size {size} is outside the allowed range 1..=200")]
    InvalidPageSize { size: i64 },

    /// The remote service answered with a non-success status. The structured
    /// reason payload is preserved when the service supplies one.
    #[error("remote call failed with status {status}")]
    Remote {
        status: u16,
        detail: Option<JsonValue>,
    },

    /// A successful response did not have the expected shape.
    #[error("unexpected response shape: {detail}")]
    UnexpectedResponse { detail: String },

    /// Transport-level failure (connection, TLS, ...).
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GridResult<T> = Result<T, GridError>;
