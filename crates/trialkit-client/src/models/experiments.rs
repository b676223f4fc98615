use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use trialkit_frame::UtcDateTime;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::models::{
    validate_page_limit, ExperimentType, DEFAULT_PAGE_LIMIT, MAX_TAGS,
};

/// Experiment instance as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub uuid: Uuid,
    pub experiment_type_id: i64,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub additional_data: BTreeMap<String, Value>,
    pub created_at: UtcDateTime,
    pub updated_at: UtcDateTime,
    #[serde(default)]
    pub experiment_type: Option<ExperimentType>,
}

/// Payload for creating an experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentDraft {
    experiment_type_id: i64,
    description: String,
    tags: Vec<String>,
    additional_data: BTreeMap<String, Value>,
}

impl ExperimentDraft {
    pub fn new(
        experiment_type_id: i64,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if experiment_type_id <= 0 {
            return Err(ValidationError::InvalidExperimentTypeId);
        }
        Ok(Self {
            experiment_type_id,
            description: description.into(),
            tags: Vec::new(),
            additional_data: BTreeMap::new(),
        })
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Result<Self, ValidationError> {
        if tags.len() > MAX_TAGS {
            return Err(ValidationError::TooManyTags {
                len: tags.len(),
                max: MAX_TAGS,
            });
        }
        self.tags = tags;
        Ok(self)
    }

    pub fn with_additional_data(mut self, additional_data: BTreeMap<String, Value>) -> Self {
        self.additional_data = additional_data;
        self
    }
}

/// Partial update payload for an experiment.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExperimentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    additional_data: Option<BTreeMap<String, Value>>,
}

impl ExperimentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Result<Self, ValidationError> {
        if tags.len() > MAX_TAGS {
            return Err(ValidationError::TooManyTags {
                len: tags.len(),
                max: MAX_TAGS,
            });
        }
        self.tags = Some(tags);
        Ok(self)
    }

    pub fn with_additional_data(mut self, additional_data: BTreeMap<String, Value>) -> Self {
        self.additional_data = Some(additional_data);
        self
    }
}

/// Filters for the experiment list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentFilter {
    pub skip: usize,
    pub limit: usize,
    pub experiment_type_id: Option<i64>,
    pub tags: Vec<String>,
}

impl Default for ExperimentFilter {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
            experiment_type_id: None,
            tags: Vec::new(),
        }
    }
}

impl ExperimentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Result<Self, ValidationError> {
        validate_page_limit(limit)?;
        self.limit = limit;
        Ok(self)
    }

    pub fn with_experiment_type(mut self, experiment_type_id: i64) -> Self {
        self.experiment_type_id = Some(experiment_type_id);
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Query parameters in the order the server documents them; `tags`
    /// repeats once per value.
    pub(crate) fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            (String::from("skip"), self.skip.to_string()),
            (String::from("limit"), self.limit.to_string()),
        ];
        if let Some(experiment_type_id) = self.experiment_type_id {
            params.push((
                String::from("experiment_type_id"),
                experiment_type_id.to_string(),
            ));
        }
        for tag in &self.tags {
            params.push((String::from("tags"), tag.clone()));
        }
        params
    }
}
