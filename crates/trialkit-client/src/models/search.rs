use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use trialkit_frame::{DataRow, UtcDateTime};

use crate::error::ValidationError;
use crate::models::{validate_page_limit, Experiment, ExperimentType, Tag, DEFAULT_PAGE_LIMIT};

const DATA_BY_TAGS_DEFAULT_LIMIT: usize = 500;

/// Search for experiments carrying certain tags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentTagSearch {
    tags: Vec<String>,
    match_all: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_after: Option<UtcDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_before: Option<UtcDateTime>,
    skip: usize,
    limit: usize,
}

impl ExperimentTagSearch {
    /// Requires at least one tag; matches all of them by default.
    pub fn new(tags: Vec<String>) -> Result<Self, ValidationError> {
        if tags.is_empty() {
            return Err(ValidationError::EmptyTagFilter);
        }
        Ok(Self {
            tags,
            match_all: true,
            created_after: None,
            created_before: None,
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        })
    }

    /// Match any of the tags instead of all of them.
    pub fn match_any(mut self) -> Self {
        self.match_all = false;
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

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Result<Self, ValidationError> {
        validate_page_limit(limit)?;
        self.limit = limit;
        Ok(self)
    }
}

/// Free-text search over names/descriptions (tags, experiment types).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSearch {
    search_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_after: Option<UtcDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_before: Option<UtcDateTime>,
    skip: usize,
    limit: usize,
}

impl TextSearch {
    pub fn new(search_text: impl Into<String>) -> Result<Self, ValidationError> {
        let search_text = search_text.into();
        if search_text.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "search_text",
            });
        }
        Ok(Self {
            search_text,
            created_after: None,
            created_before: None,
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        })
    }

    pub fn with_created_after(mut self, created_after: UtcDateTime) -> Self {
        self.created_after = Some(created_after);
        self
    }

    pub fn with_created_before(mut self, created_before: UtcDateTime) -> Self {
        self.created_before = Some(created_before);
        self
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
}

/// Multi-criteria experiment search; every criterion is optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvancedExperimentSearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    search_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
    match_all_tags: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    experiment_type_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_after: Option<UtcDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_before: Option<UtcDateTime>,
    skip: usize,
    limit: usize,
}

impl Default for AdvancedExperimentSearch {
    fn default() -> Self {
        Self {
            search_text: None,
            tags: None,
            match_all_tags: true,
            experiment_type_id: None,
            created_after: None,
            created_before: None,
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl AdvancedExperimentSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, search_text: impl Into<String>) -> Self {
        self.search_text = Some(search_text.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn match_any_tags(mut self) -> Self {
        self.match_all_tags = false;
        self
    }

    pub fn with_experiment_type(mut self, experiment_type_id: i64) -> Self {
        self.experiment_type_id = Some(experiment_type_id);
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

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Result<Self, ValidationError> {
        validate_page_limit(limit)?;
        self.limit = limit;
        Ok(self)
    }
}

/// Search returning the data rows of every experiment matching the tags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataByTagsSearch {
    tags: Vec<String>,
    match_all: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_after: Option<UtcDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_before: Option<UtcDateTime>,
    skip: usize,
    limit: usize,
}

impl DataByTagsSearch {
    pub fn new(tags: Vec<String>) -> Result<Self, ValidationError> {
        if tags.is_empty() {
            return Err(ValidationError::EmptyTagFilter);
        }
        Ok(Self {
            tags,
            match_all: true,
            created_after: None,
            created_before: None,
            skip: 0,
            limit: DATA_BY_TAGS_DEFAULT_LIMIT,
        })
    }

    pub fn match_any(mut self) -> Self {
        self.match_all = false;
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

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Result<Self, ValidationError> {
        validate_page_limit(limit)?;
        self.limit = limit;
        Ok(self)
    }
}

/// Pagination block attached to search responses.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub skip: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub total: usize,
}

/// One page of experiment search results.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExperimentSearchPage {
    #[serde(default)]
    pub experiments: Vec<Experiment>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub pagination: Option<PageInfo>,
}

/// One page of experiment type search results.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExperimentTypeSearchPage {
    #[serde(default)]
    pub experiment_types: Vec<ExperimentType>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub pagination: Option<PageInfo>,
}

/// One page of tag search results.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TagSearchPage {
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub pagination: Option<PageInfo>,
}

/// Data rows gathered across every experiment matching a tag search,
/// with per-experiment metadata keyed by experiment UUID.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataByTagsPage {
    #[serde(default)]
    pub data: Vec<DataRow>,
    #[serde(default)]
    pub total_rows: usize,
    #[serde(default)]
    pub total_experiments: usize,
    #[serde(default)]
    pub experiment_info: BTreeMap<String, Value>,
    #[serde(default)]
    pub pagination: Option<PageInfo>,
}
