//! Drift detection between a locally declared schema and the live remote
//! table.
//!
//! Reconciliation is invoked explicitly (typically once, before first use
//! in a long-running process), never implicitly per operation. All findings
//! are aggregated into one report instead of failing fast.

use serde::Deserialize;

use crate::domain::config::{DurationFormat, FieldConfig, FieldTypeTag, SelectOption};
use crate::domain::schema::RowSchema;

/// Field metadata as reported by the service's field listing endpoint.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RemoteField {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub tag: FieldTypeTag,
    #[serde(default)]
    pub primary: bool,
    // Config keys the service inlines into the field descriptor. Only the
    // semantically significant ones are compared.
    #[serde(default)]
    pub number_decimal_places: Option<u8>,
    #[serde(default)]
    pub select_options: Vec<SelectOption>,
    #[serde(default)]
    pub duration_format: Option<DurationFormat>,
}

/// One reconciliation finding.
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    /// A schema field's wire name does not exist in the remote table.
    FieldNotInRemoteTable { wire_name: String },
    /// The remote field exists but its type tag or significant config
    /// differs from the declaration.
    FieldTypeMismatch {
        wire_name: String,
        declared: FieldTypeTag,
        remote: FieldTypeTag,
        detail: Option<String>,
    },
    /// The remote table's primary field is not the declared one.
    PrimaryFieldMismatch {
        declared: String,
        remote: Option<String>,
    },
    /// A remote field the schema does not map. Informational: the schema is
    /// allowed to be a strict subset of the remote table.
    UnmappedRemoteField {
        wire_name: String,
        tag: FieldTypeTag,
    },
}

impl Finding {
    pub fn is_informational(&self) -> bool {
        matches!(self, Finding::UnmappedRemoteField { .. })
    }
}

/// The complete drift picture for one schema, gathered in a single pass.
/// Findings are data, not errors; the caller decides whether a non-empty
/// report is fatal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReconciliationReport {
    pub findings: Vec<Finding>,
}

impl ReconciliationReport {
    /// True when no finding blocks operations (informational findings are
    /// ignored).
    pub fn is_clean(&self) -> bool {
        self.findings.iter().all(Finding::is_informational)
    }

    pub fn drift(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.is_informational())
    }
}

/// Compares a declared schema against the remote field list and reports all
/// drift in one call.
pub fn reconcile(schema: &RowSchema, remote: &[RemoteField]) -> ReconciliationReport {
    let mut findings = Vec::new();
    let mut consumed = vec![false; remote.len()];

    for field in schema.fields() {
        let position = remote.iter().position(|r| r.name == field.wire_name());
        let Some(index) = position else {
            findings.push(Finding::FieldNotInRemoteTable {
                wire_name: field.wire_name().to_string(),
            });
            continue;
        };
        consumed[index] = true;
        let remote_field = &remote[index];
        if remote_field.tag != field.tag() {
            findings.push(Finding::FieldTypeMismatch {
                wire_name: field.wire_name().to_string(),
                declared: field.tag(),
                remote: remote_field.tag,
                detail: None,
            });
        } else if let Some(detail) = config_drift(field.config(), remote_field) {
            findings.push(Finding::FieldTypeMismatch {
                wire_name: field.wire_name().to_string(),
                declared: field.tag(),
                remote: remote_field.tag,
                detail: Some(detail),
            });
        }
    }

    let declared_primary = schema.primary_field().wire_name();
    let remote_primary = remote.iter().find(|r| r.primary).map(|r| r.name.clone());
    if remote_primary.as_deref() != Some(declared_primary) {
        findings.push(Finding::PrimaryFieldMismatch {
            declared: declared_primary.to_string(),
            remote: remote_primary,
        });
    }

    for (index, remote_field) in remote.iter().enumerate() {
        if !consumed[index] {
            findings.push(Finding::UnmappedRemoteField {
                wire_name: remote_field.name.clone(),
                tag: remote_field.tag,
            });
        }
    }

    for finding in findings.iter().filter(|f| !f.is_informational()) {
        tracing::warn!(?finding, "schema drift detected");
    }

    ReconciliationReport { findings }
}

/// Compares the semantically significant parts of a field config against
/// the remote descriptor. Returns a human-readable description of the first
/// difference.
fn config_drift(config: &FieldConfig, remote: &RemoteField) -> Option<String> {
    match config {
        FieldConfig::Number { decimal_places, .. } => {
            let remote_places = remote.number_decimal_places.unwrap_or(0);
            if remote_places != *decimal_places {
                return Some(format!(
                    "declared {} decimal place(s), remote has {}",
                    decimal_places, remote_places
                ));
            }
            None
        }
        FieldConfig::SingleSelect { options } | FieldConfig::MultipleSelect { options } => {
            let mut declared: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
            let mut remote_values: Vec<&str> = remote
                .select_options
                .iter()
                .map(|o| o.value.as_str())
                .collect();
            declared.sort_unstable();
            remote_values.sort_unstable();
            if declared != remote_values {
                return Some(format!(
                    "declared options [{}] differ from remote options [{}]",
                    declared.join(", "),
                    remote_values.join(", ")
                ));
            }
            None
        }
        FieldConfig::Duration { format } => match remote.duration_format {
            Some(remote_format) if remote_format != *format => Some(format!(
                "declared duration format '{}', remote has '{}'",
                format.as_str(),
                remote_format.as_str()
            )),
            _ => None,
        },
        _ => None,
    }
}
