pub mod app;
pub mod domain;
pub mod error;
pub mod infra;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::table_service::{
    ListRequest, RowPage, RowPager, TableService, DEFAULT_PAGE_SIZE, MAX_BATCH_SIZE, MAX_PAGE_SIZE,
};
pub use domain::codec::FieldCodec;
pub use domain::config::{DurationFormat, FieldConfig, FieldTypeTag, RatingStyle, SelectOption};
pub use domain::field::{
    Attachment, DateTimeValue, LinkValue, NumberValue, Row, RowId, RowLink, SelectRef, TableId,
    UserRef, Value,
};
pub use domain::filter::{Combinator, Filter, FilterOperator};
pub use domain::reconcile::{reconcile, Finding, ReconciliationReport, RemoteField};
pub use domain::schema::{RowSchema, RowValues, SchemaBuilder, SchemaField, TableBinding};
pub use error::{GridError, GridResult};
pub use infra::config::Config;
pub use infra::context::ClientContext;
pub use transport::{HttpTransport, Method, Transport, TransportResponse};
