//! Wire models and validated request payloads.
//!
//! Draft/patch types validate at construction, mirroring the rules the
//! server enforces, so malformed payloads fail before a request is made.

mod data;
mod experiment_types;
mod experiments;
mod search;
mod tags;

pub use data::{DataCount, DataQuery, DataRowDraft, DataRowPatch, RowDeleteReceipt, RowFilter};
pub use experiment_types::{
    validate_schema_definition, ColumnSpec, ExperimentType, ExperimentTypeDraft,
    ExperimentTypePatch, SchemaDefinition, SUPPORTED_COLUMN_TYPES,
};
pub use experiments::{Experiment, ExperimentDraft, ExperimentFilter, ExperimentPatch};
pub use search::{
    AdvancedExperimentSearch, DataByTagsPage, DataByTagsSearch, ExperimentSearchPage,
    ExperimentTagSearch, ExperimentTypeSearchPage, PageInfo, TagSearchPage, TextSearch,
};
pub use tags::{Tag, TagDraft, TagPatch};

use serde::Deserialize;

use crate::error::ValidationError;

/// Maximum length for tag / type / participant name fields.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum number of tags attachable to one experiment.
pub const MAX_TAGS: usize = 10;

/// Largest page the server will return.
pub const MAX_PAGE_LIMIT: usize = 1000;

/// Default page size for list and query endpoints.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Version and compatibility report from the server's version endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerVersion {
    pub api_version: String,
    #[serde(default)]
    pub client_version: Option<String>,
    #[serde(default)]
    pub compatible: Option<bool>,
    #[serde(default)]
    pub compatibility_rule: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
}

pub(crate) fn validate_name(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::FieldTooLong { field, len, max });
    }
    Ok(())
}

pub(crate) fn validate_page_limit(value: usize) -> Result<(), ValidationError> {
    if value == 0 || value > MAX_PAGE_LIMIT {
        return Err(ValidationError::InvalidPageLimit {
            value,
            max: MAX_PAGE_LIMIT,
        });
    }
    Ok(())
}
