use serde_json::{Map, Value};
use trialkit_frame::{records_to_table, Table};

use crate::engine::{ApiRequest, RequestEngine};
use crate::error::ClientError;
use crate::models::{Tag, TagDraft, TagPatch};

/// Wrappers for the tag endpoints.
pub struct TagsResource<'a> {
    engine: &'a RequestEngine,
}

impl<'a> TagsResource<'a> {
    pub(crate) fn new(engine: &'a RequestEngine) -> Self {
        Self { engine }
    }

    pub async fn create(&self, draft: &TagDraft) -> Result<Tag, ClientError> {
        let request = ApiRequest::post("/api/v1/tags/").with_body(serde_json::to_value(draft)?);
        let payload = self.engine.execute(&request).await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn get(&self, tag_id: i64) -> Result<Tag, ClientError> {
        let payload = self
            .engine
            .execute(&ApiRequest::get(format!("/api/v1/tags/{tag_id}")))
            .await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn list(&self, skip: usize, limit: usize) -> Result<Vec<Tag>, ClientError> {
        let payload = self.engine.execute(&self.list_request(skip, limit)).await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn update(&self, tag_id: i64, patch: &TagPatch) -> Result<Tag, ClientError> {
        let request = ApiRequest::put(format!("/api/v1/tags/{tag_id}"))
            .with_body(serde_json::to_value(patch)?);
        let payload = self.engine.execute(&request).await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn delete(&self, tag_id: i64) -> Result<Value, ClientError> {
        let payload = self
            .engine
            .execute(&ApiRequest::delete(format!("/api/v1/tags/{tag_id}")))
            .await?;
        Ok(payload)
    }

    /// Lists tags as a typed table with parsed timestamp columns.
    pub async fn list_table(&self, skip: usize, limit: usize) -> Result<Table, ClientError> {
        let payload = self.engine.execute(&self.list_request(skip, limit)).await?;
        let records: Vec<Map<String, Value>> = serde_json::from_value(payload)?;
        Ok(records_to_table(&records, &["created_at", "updated_at"], &[])?)
    }

    fn list_request(&self, skip: usize, limit: usize) -> ApiRequest {
        ApiRequest::get("/api/v1/tags/")
            .with_param("skip", skip.to_string())
            .with_param("limit", limit.to_string())
    }
}
