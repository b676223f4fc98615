use serde_json::{Map, Value};
use trialkit_frame::{records_to_table, Table};
use uuid::Uuid;

use crate::engine::{ApiRequest, RequestEngine};
use crate::error::ClientError;
use crate::models::{Experiment, ExperimentDraft, ExperimentFilter, ExperimentPatch};

const LIST_TABLE_TIMESTAMPS: [&str; 4] = [
    "created_at",
    "updated_at",
    "type_created_at",
    "type_updated_at",
];

/// Wrappers for the experiment endpoints.
pub struct ExperimentsResource<'a> {
    engine: &'a RequestEngine,
}

impl<'a> ExperimentsResource<'a> {
    pub(crate) fn new(engine: &'a RequestEngine) -> Self {
        Self { engine }
    }

    pub async fn create(&self, draft: &ExperimentDraft) -> Result<Experiment, ClientError> {
        let request =
            ApiRequest::post("/api/v1/experiments/").with_body(serde_json::to_value(draft)?);
        let payload = self.engine.execute(&request).await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn get(&self, experiment_uuid: &Uuid) -> Result<Experiment, ClientError> {
        let payload = self
            .engine
            .execute(&ApiRequest::get(format!(
                "/api/v1/experiments/{experiment_uuid}"
            )))
            .await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn list(&self, filter: &ExperimentFilter) -> Result<Vec<Experiment>, ClientError> {
        let payload = self.engine.execute(&self.list_request(filter)).await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn update(
        &self,
        experiment_uuid: &Uuid,
        patch: &ExperimentPatch,
    ) -> Result<Experiment, ClientError> {
        let request = ApiRequest::put(format!("/api/v1/experiments/{experiment_uuid}"))
            .with_body(serde_json::to_value(patch)?);
        let payload = self.engine.execute(&request).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Deletes an experiment; requires an ADMIN-level key.
    pub async fn delete(&self, experiment_uuid: &Uuid) -> Result<Value, ClientError> {
        let payload = self
            .engine
            .execute(&ApiRequest::delete(format!(
                "/api/v1/experiments/{experiment_uuid}"
            )))
            .await?;
        Ok(payload)
    }

    /// Column schema of the experiment's data table.
    pub async fn columns(&self, experiment_uuid: &Uuid) -> Result<Value, ClientError> {
        let payload = self
            .engine
            .execute(&ApiRequest::get(format!(
                "/api/v1/experiments/{experiment_uuid}/columns"
            )))
            .await?;
        Ok(payload)
    }

    pub async fn by_tags(&self, tags: Vec<String>) -> Result<Vec<Experiment>, ClientError> {
        self.list(&ExperimentFilter::new().with_tags(tags)).await
    }

    pub async fn by_type(&self, experiment_type_id: i64) -> Result<Vec<Experiment>, ClientError> {
        self.list(&ExperimentFilter::new().with_experiment_type(experiment_type_id))
            .await
    }

    /// Lists experiments as a typed table.
    ///
    /// The nested experiment type is flattened into `type_`-prefixed
    /// columns and all four timestamp columns are parsed.
    pub async fn list_table(&self, filter: &ExperimentFilter) -> Result<Table, ClientError> {
        let payload = self.engine.execute(&self.list_request(filter)).await?;
        let records: Vec<Map<String, Value>> = serde_json::from_value(payload)?;
        let records: Vec<Map<String, Value>> =
            records.into_iter().map(flatten_experiment_type).collect();
        Ok(records_to_table(&records, &LIST_TABLE_TIMESTAMPS, &[])?)
    }

    fn list_request(&self, filter: &ExperimentFilter) -> ApiRequest {
        let mut request = ApiRequest::get("/api/v1/experiments/");
        for (name, value) in filter.to_params() {
            request = request.with_param(name, value);
        }
        request
    }
}

fn flatten_experiment_type(mut record: Map<String, Value>) -> Map<String, Value> {
    if let Some(Value::Object(nested)) = record.remove("experiment_type") {
        for (key, value) in nested {
            record.insert(format!("type_{key}"), value);
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_experiment_type_flattens_with_prefix() {
        let record: Map<String, Value> = serde_json::from_value(json!({
            "uuid": "0192a0c6-2f2b-7e8e-b9d1-54a1c8d2e9aa",
            "description": "memory study",
            "experiment_type": { "id": 3, "name": "reaction_time" }
        }))
        .expect("record");

        let flattened = flatten_experiment_type(record);

        assert!(!flattened.contains_key("experiment_type"));
        assert_eq!(flattened["type_id"], json!(3));
        assert_eq!(flattened["type_name"], json!("reaction_time"));
    }

    #[test]
    fn missing_experiment_type_is_left_alone() {
        let record: Map<String, Value> =
            serde_json::from_value(json!({ "description": "memory study" })).expect("record");
        let flattened = flatten_experiment_type(record);
        assert_eq!(flattened.len(), 1);
    }
}
