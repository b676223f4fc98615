use serde_json::{Map, Value};
use trialkit_frame::{records_to_table, Table};
use urlencoding::encode;

use crate::engine::{ApiRequest, RequestEngine};
use crate::error::ClientError;
use crate::models::{ExperimentType, ExperimentTypeDraft, ExperimentTypePatch};

/// Wrappers for the experiment type endpoints.
pub struct ExperimentTypesResource<'a> {
    engine: &'a RequestEngine,
}

impl<'a> ExperimentTypesResource<'a> {
    pub(crate) fn new(engine: &'a RequestEngine) -> Self {
        Self { engine }
    }

    pub async fn create(&self, draft: &ExperimentTypeDraft) -> Result<ExperimentType, ClientError> {
        let request =
            ApiRequest::post("/api/v1/experiment-types/").with_body(serde_json::to_value(draft)?);
        let payload = self.engine.execute(&request).await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn get(&self, experiment_type_id: i64) -> Result<ExperimentType, ClientError> {
        let payload = self
            .engine
            .execute(&ApiRequest::get(format!(
                "/api/v1/experiment-types/{experiment_type_id}"
            )))
            .await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn list(
        &self,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<ExperimentType>, ClientError> {
        let payload = self.engine.execute(&self.list_request(skip, limit)).await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn update(
        &self,
        experiment_type_id: i64,
        patch: &ExperimentTypePatch,
    ) -> Result<ExperimentType, ClientError> {
        let request = ApiRequest::put(format!("/api/v1/experiment-types/{experiment_type_id}"))
            .with_body(serde_json::to_value(patch)?);
        let payload = self.engine.execute(&request).await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn delete(&self, experiment_type_id: i64) -> Result<Value, ClientError> {
        let payload = self
            .engine
            .execute(&ApiRequest::delete(format!(
                "/api/v1/experiment-types/{experiment_type_id}"
            )))
            .await?;
        Ok(payload)
    }

    /// Column schema for an experiment type, looked up by name.
    pub async fn columns_by_name(&self, experiment_type_name: &str) -> Result<Value, ClientError> {
        let payload = self
            .engine
            .execute(&ApiRequest::get(format!(
                "/api/v1/experiment-types/name/{}/columns",
                encode(experiment_type_name)
            )))
            .await?;
        Ok(payload)
    }

    /// Lists experiment types as a typed table with parsed timestamps.
    pub async fn list_table(&self, skip: usize, limit: usize) -> Result<Table, ClientError> {
        let payload = self.engine.execute(&self.list_request(skip, limit)).await?;
        let records: Vec<Map<String, Value>> = serde_json::from_value(payload)?;
        Ok(records_to_table(&records, &["created_at", "updated_at"], &[])?)
    }

    fn list_request(&self, skip: usize, limit: usize) -> ApiRequest {
        ApiRequest::get("/api/v1/experiment-types/")
            .with_param("skip", skip.to_string())
            .with_param("limit", limit.to_string())
    }
}
