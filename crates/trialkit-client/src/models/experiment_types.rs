use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use trialkit_frame::{is_reserved_column, UtcDateTime};

use crate::error::ValidationError;
use crate::models::{validate_name, MAX_NAME_LEN};

/// Column types an experiment schema may declare.
pub const SUPPORTED_COLUMN_TYPES: [&str; 7] = [
    "INTEGER", "FLOAT", "STRING", "TEXT", "BOOLEAN", "DATETIME", "JSON",
];

/// One column definition: either a bare type name or an object with a
/// `type` field plus provider-specific options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSpec {
    Name(String),
    Detailed {
        #[serde(rename = "type")]
        column_type: String,
        #[serde(flatten)]
        options: BTreeMap<String, Value>,
    },
}

impl ColumnSpec {
    pub fn type_name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Detailed { column_type, .. } => column_type,
        }
    }
}

/// Declared data schema of an experiment type, column name to spec.
pub type SchemaDefinition = BTreeMap<String, ColumnSpec>;

/// Validates a schema definition against the server's rules: no reserved
/// column names, only supported column types.
pub fn validate_schema_definition(schema: &SchemaDefinition) -> Result<(), ValidationError> {
    for (name, spec) in schema {
        if is_reserved_column(name) {
            return Err(ValidationError::ReservedColumnName { name: name.clone() });
        }

        let type_name = spec.type_name();
        if type_name.trim().is_empty() {
            return Err(ValidationError::MissingColumnType { name: name.clone() });
        }
        if !SUPPORTED_COLUMN_TYPES.contains(&type_name.to_ascii_uppercase().as_str()) {
            return Err(ValidationError::UnsupportedColumnType {
                name: name.clone(),
                value: type_name.to_owned(),
            });
        }
    }
    Ok(())
}

/// Experiment type as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentType {
    pub id: i64,
    pub name: String,
    pub table_name: String,
    #[serde(default)]
    pub schema_definition: BTreeMap<String, Value>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: UtcDateTime,
    pub updated_at: UtcDateTime,
}

/// Payload for creating an experiment type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentTypeDraft {
    name: String,
    table_name: String,
    schema_definition: SchemaDefinition,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl ExperimentTypeDraft {
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let table_name = table_name.into();
        validate_name("experiment type name", &name, MAX_NAME_LEN)?;
        validate_name("table name", &table_name, MAX_NAME_LEN)?;
        Ok(Self {
            name,
            table_name,
            schema_definition: SchemaDefinition::new(),
            description: None,
        })
    }

    pub fn with_schema(mut self, schema: SchemaDefinition) -> Result<Self, ValidationError> {
        validate_schema_definition(&schema)?;
        self.schema_definition = schema;
        Ok(self)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update payload for an experiment type.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ExperimentTypePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema_definition: Option<SchemaDefinition>,
}

impl ExperimentTypePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_name("experiment type name", &name, MAX_NAME_LEN)?;
        self.name = Some(name);
        Ok(self)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_schema(mut self, schema: SchemaDefinition) -> Result<Self, ValidationError> {
        validate_schema_definition(&schema)?;
        self.schema_definition = Some(schema);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(entries: &[(&str, &str)]) -> SchemaDefinition {
        entries
            .iter()
            .map(|(name, ty)| ((*name).to_owned(), ColumnSpec::Name((*ty).to_owned())))
            .collect()
    }

    #[test]
    fn accepts_supported_types_case_insensitively() {
        let schema = schema(&[("reaction_time", "float"), ("stimulus", "STRING")]);
        assert!(validate_schema_definition(&schema).is_ok());
    }

    #[test]
    fn rejects_reserved_column_names() {
        let schema = schema(&[("Participant_ID", "STRING")]);
        let err = validate_schema_definition(&schema).expect_err("must fail");
        assert!(matches!(err, ValidationError::ReservedColumnName { .. }));
    }

    #[test]
    fn rejects_unsupported_column_type() {
        let schema = schema(&[("weights", "BLOB")]);
        let err = validate_schema_definition(&schema).expect_err("must fail");
        assert!(matches!(err, ValidationError::UnsupportedColumnType { .. }));
    }

    #[test]
    fn detailed_column_spec_roundtrips_type_field() {
        let spec: ColumnSpec = serde_json::from_value(serde_json::json!({
            "type": "FLOAT",
            "nullable": true
        }))
        .expect("spec should deserialize");
        assert_eq!(spec.type_name(), "FLOAT");
    }

    #[test]
    fn draft_with_invalid_schema_is_rejected() {
        let draft = ExperimentTypeDraft::new("rt_study", "rt_data")
            .expect("valid draft")
            .with_schema(schema(&[("id", "INTEGER")]));
        assert!(draft.is_err());
    }
}
