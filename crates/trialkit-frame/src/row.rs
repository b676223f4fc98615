use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::UtcDateTime;

/// Mandatory columns present on every experiment data row.
///
/// Custom fields defined by an experiment schema may never shadow these
/// names; the server rejects such schemas and [`crate::normalize`] reports
/// any row that slips through as a schema error.
pub const MANDATORY_COLUMNS: [&str; 5] = [
    "id",
    "experiment_uuid",
    "participant_id",
    "created_at",
    "updated_at",
];

/// Returns true when `name` matches a mandatory column, ignoring case.
pub fn is_reserved_column(name: &str) -> bool {
    MANDATORY_COLUMNS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

/// One experiment data row with a dynamic per-experiment schema.
///
/// The identity and time fields are fixed; everything else the server
/// returns for the row lands in `values`, keyed by column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    pub id: i64,
    pub experiment_uuid: Uuid,
    pub participant_id: String,
    pub created_at: UtcDateTime,
    pub updated_at: UtcDateTime,
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

impl DataRow {
    /// The custom (schema-defined) fields of this row.
    pub fn custom_values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}
