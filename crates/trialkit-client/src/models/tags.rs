use serde::{Deserialize, Serialize};
use trialkit_frame::UtcDateTime;

use crate::error::ValidationError;
use crate::models::{validate_name, MAX_NAME_LEN};

/// Tag as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: UtcDateTime,
    pub updated_at: UtcDateTime,
}

/// Payload for creating a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagDraft {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl TagDraft {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_name("tag name", &name, MAX_NAME_LEN)?;
        Ok(Self {
            name,
            description: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update payload for a tag; unset fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TagPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl TagPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_name("tag name", &name, MAX_NAME_LEN)?;
        self.name = Some(name);
        Ok(self)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_overlong_tag_name() {
        let err = TagDraft::new("x".repeat(101)).expect_err("must fail");
        assert!(matches!(err, ValidationError::FieldTooLong { max: 100, .. }));
    }

    #[test]
    fn rejects_empty_tag_name() {
        let err = TagDraft::new("  ").expect_err("must fail");
        assert!(matches!(err, ValidationError::EmptyField { .. }));
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = TagPatch::new().with_description("visual tasks");
        let value = serde_json::to_value(&patch).expect("serializable");
        assert_eq!(value, serde_json::json!({ "description": "visual tasks" }));
    }
}
