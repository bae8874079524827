//! Domain model: field values, codecs, schemas, filters, reconciliation.

pub mod codec;
pub mod config;
pub mod field;
pub mod filter;
pub mod reconcile;
pub mod schema;
