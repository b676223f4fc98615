use serde_json::Value;
use trialkit_frame::{normalize, DataRow, Table};
use uuid::Uuid;

use crate::engine::{ApiRequest, RequestEngine};
use crate::error::ClientError;
use crate::models::{DataCount, DataQuery, DataRowDraft, DataRowPatch, RowDeleteReceipt, RowFilter};

/// Wrappers for the experiment data endpoints.
///
/// The tabular variants (`rows_table`, `query_table`, `fetch_all_table`)
/// run the fetched rows through [`normalize`], so the result is one
/// uniform table even when rows carry disjoint custom schemas.
pub struct ExperimentDataResource<'a> {
    engine: &'a RequestEngine,
}

impl<'a> ExperimentDataResource<'a> {
    pub(crate) fn new(engine: &'a RequestEngine) -> Self {
        Self { engine }
    }

    pub async fn create(
        &self,
        experiment_uuid: &Uuid,
        draft: &DataRowDraft,
    ) -> Result<DataRow, ClientError> {
        let request = ApiRequest::post(format!("/api/v1/experiment-data/{experiment_uuid}/data/"))
            .with_body(serde_json::to_value(draft)?);
        let payload = self.engine.execute(&request).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Creates several rows with one request per row, in order.
    pub async fn create_batch(
        &self,
        experiment_uuid: &Uuid,
        drafts: &[DataRowDraft],
    ) -> Result<Vec<DataRow>, ClientError> {
        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            created.push(self.create(experiment_uuid, draft).await?);
        }
        Ok(created)
    }

    pub async fn rows(
        &self,
        experiment_uuid: &Uuid,
        filter: &RowFilter,
    ) -> Result<Vec<DataRow>, ClientError> {
        let payload = self
            .engine
            .execute(&self.rows_request(experiment_uuid, filter))
            .await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Fetches rows and normalizes them into one table.
    pub async fn rows_table(
        &self,
        experiment_uuid: &Uuid,
        filter: &RowFilter,
    ) -> Result<Table, ClientError> {
        let rows = self.rows(experiment_uuid, filter).await?;
        Ok(normalize(&rows)?)
    }

    pub async fn count(
        &self,
        experiment_uuid: &Uuid,
        participant_id: Option<&str>,
    ) -> Result<DataCount, ClientError> {
        let mut request = ApiRequest::get(format!(
            "/api/v1/experiment-data/{experiment_uuid}/data/count"
        ));
        if let Some(participant_id) = participant_id {
            request = request.with_param("participant_id", participant_id);
        }
        let payload = self.engine.execute(&request).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Detailed column type information for the experiment's data table.
    pub async fn columns(&self, experiment_uuid: &Uuid) -> Result<Value, ClientError> {
        let payload = self
            .engine
            .execute(&ApiRequest::get(format!(
                "/api/v1/experiment-data/{experiment_uuid}/data/columns"
            )))
            .await?;
        Ok(payload)
    }

    pub async fn row(&self, experiment_uuid: &Uuid, row_id: i64) -> Result<DataRow, ClientError> {
        let payload = self
            .engine
            .execute(&ApiRequest::get(format!(
                "/api/v1/experiment-data/{experiment_uuid}/data/row/{row_id}"
            )))
            .await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn update_row(
        &self,
        experiment_uuid: &Uuid,
        row_id: i64,
        patch: &DataRowPatch,
    ) -> Result<DataRow, ClientError> {
        let request = ApiRequest::put(format!(
            "/api/v1/experiment-data/{experiment_uuid}/data/row/{row_id}"
        ))
        .with_body(serde_json::to_value(patch)?);
        let payload = self.engine.execute(&request).await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn delete_row(
        &self,
        experiment_uuid: &Uuid,
        row_id: i64,
    ) -> Result<RowDeleteReceipt, ClientError> {
        let payload = self
            .engine
            .execute(&ApiRequest::delete(format!(
                "/api/v1/experiment-data/{experiment_uuid}/data/row/{row_id}"
            )))
            .await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn query(
        &self,
        experiment_uuid: &Uuid,
        query: &DataQuery,
    ) -> Result<Vec<DataRow>, ClientError> {
        let request = ApiRequest::post(format!(
            "/api/v1/experiment-data/{experiment_uuid}/data/query"
        ))
        .with_body(serde_json::to_value(query)?);
        let payload = self.engine.execute(&request).await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn query_table(
        &self,
        experiment_uuid: &Uuid,
        query: &DataQuery,
    ) -> Result<Table, ClientError> {
        let rows = self.query(experiment_uuid, query).await?;
        Ok(normalize(&rows)?)
    }

    /// Fetches every row of the experiment with automatic pagination.
    ///
    /// Pages are requested sequentially; fetching stops on the first page
    /// that is empty or shorter than `batch_size`.
    pub async fn fetch_all(
        &self,
        experiment_uuid: &Uuid,
        batch_size: usize,
    ) -> Result<Vec<DataRow>, ClientError> {
        let mut all_rows = Vec::new();
        let mut offset = 0;

        loop {
            let filter = RowFilter::new().with_limit(batch_size)?.with_offset(offset);
            let batch = self.rows(experiment_uuid, &filter).await?;
            let fetched = batch.len();
            all_rows.extend(batch);

            if fetched == 0 || fetched < batch_size {
                break;
            }
            offset += batch_size;
        }

        Ok(all_rows)
    }

    pub async fn fetch_all_table(
        &self,
        experiment_uuid: &Uuid,
        batch_size: usize,
    ) -> Result<Table, ClientError> {
        let rows = self.fetch_all(experiment_uuid, batch_size).await?;
        Ok(normalize(&rows)?)
    }

    fn rows_request(&self, experiment_uuid: &Uuid, filter: &RowFilter) -> ApiRequest {
        let mut request =
            ApiRequest::get(format!("/api/v1/experiment-data/{experiment_uuid}/data/"));
        for (name, value) in filter.to_params() {
            request = request.with_param(name, value);
        }
        request
    }
}
