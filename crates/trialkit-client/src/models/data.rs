use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use trialkit_frame::UtcDateTime;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::models::{validate_name, validate_page_limit, DEFAULT_PAGE_LIMIT, MAX_NAME_LEN};

/// Payload for adding one data row to an experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataRowDraft {
    participant_id: String,
    data: BTreeMap<String, Value>,
}

impl DataRowDraft {
    pub fn new(
        participant_id: impl Into<String>,
        data: BTreeMap<String, Value>,
    ) -> Result<Self, ValidationError> {
        let participant_id = participant_id.into();
        validate_name("participant_id", &participant_id, MAX_NAME_LEN)?;
        Ok(Self {
            participant_id,
            data,
        })
    }
}

/// Partial update payload for a data row.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DataRowPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    participant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<BTreeMap<String, Value>>,
}

impl DataRowPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_participant_id(
        mut self,
        participant_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let participant_id = participant_id.into();
        validate_name("participant_id", &participant_id, MAX_NAME_LEN)?;
        self.participant_id = Some(participant_id);
        Ok(self)
    }

    pub fn with_data(mut self, data: BTreeMap<String, Value>) -> Self {
        self.data = Some(data);
        self
    }
}

/// Filters for the data row list endpoint (sent as query parameters).
#[derive(Debug, Clone, PartialEq)]
pub struct RowFilter {
    pub participant_id: Option<String>,
    pub created_after: Option<UtcDateTime>,
    pub created_before: Option<UtcDateTime>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for RowFilter {
    fn default() -> Self {
        Self {
            participant_id: None,
            created_after: None,
            created_before: None,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_participant(
        mut self,
        participant_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let participant_id = participant_id.into();
        validate_name("participant_id", &participant_id, MAX_NAME_LEN)?;
        self.participant_id = Some(participant_id);
        Ok(self)
    }

    pub fn with_created_after(mut self, created_after: UtcDateTime) -> Self {
        self.created_after = Some(created_after);
        self
    }

    pub fn with_created_before(mut self, created_before: UtcDateTime) -> Self {
        self.created_before = Some(created_before);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Result<Self, ValidationError> {
        validate_page_limit(limit)?;
        self.limit = limit;
        Ok(self)
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub(crate) fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            (String::from("limit"), self.limit.to_string()),
            (String::from("offset"), self.offset.to_string()),
        ];
        if let Some(participant_id) = &self.participant_id {
            params.push((String::from("participant_id"), participant_id.clone()));
        }
        if let Some(created_after) = self.created_after {
            params.push((String::from("created_after"), created_after.format_rfc3339()));
        }
        if let Some(created_before) = self.created_before {
            params.push((
                String::from("created_before"),
                created_before.format_rfc3339(),
            ));
        }
        params
    }
}

/// Advanced query payload for the data query endpoint (sent as a body).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    participant_id: Option<String>,
    filters: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_after: Option<UtcDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_before: Option<UtcDateTime>,
    limit: usize,
    offset: usize,
}

impl Default for DataQuery {
    fn default() -> Self {
        Self {
            participant_id: None,
            filters: BTreeMap::new(),
            created_after: None,
            created_before: None,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl DataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_participant(
        mut self,
        participant_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let participant_id = participant_id.into();
        validate_name("participant_id", &participant_id, MAX_NAME_LEN)?;
        self.participant_id = Some(participant_id);
        Ok(self)
    }

    /// Adds an exact-match filter on a custom data column.
    pub fn with_filter(mut self, column: impl Into<String>, value: Value) -> Self {
        self.filters.insert(column.into(), value);
        self
    }

    pub fn with_created_after(mut self, created_after: UtcDateTime) -> Self {
        self.created_after = Some(created_after);
        self
    }

    pub fn with_created_before(mut self, created_before: UtcDateTime) -> Self {
        self.created_before = Some(created_before);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Result<Self, ValidationError> {
        validate_page_limit(limit)?;
        self.limit = limit;
        Ok(self)
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Row count response for an experiment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataCount {
    pub count: u64,
    #[serde(default)]
    pub participant_id: Option<String>,
    pub experiment_id: Uuid,
}

/// Confirmation returned when a data row is deleted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RowDeleteReceipt {
    pub message: String,
    pub deleted_id: i64,
    pub experiment_id: Uuid,
}
