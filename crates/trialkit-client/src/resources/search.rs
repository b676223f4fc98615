use trialkit_frame::{normalize, Table};

use crate::engine::{ApiRequest, RequestEngine};
use crate::error::ClientError;
use crate::models::{
    AdvancedExperimentSearch, DataByTagsPage, DataByTagsSearch, ExperimentSearchPage,
    ExperimentTagSearch, ExperimentTypeSearchPage, TagSearchPage, TextSearch,
};

/// Wrappers for the cross-resource search endpoints.
pub struct SearchResource<'a> {
    engine: &'a RequestEngine,
}

impl<'a> SearchResource<'a> {
    pub(crate) fn new(engine: &'a RequestEngine) -> Self {
        Self { engine }
    }

    pub async fn experiments_by_tags(
        &self,
        search: &ExperimentTagSearch,
    ) -> Result<ExperimentSearchPage, ClientError> {
        let request = ApiRequest::post("/api/v1/search/experiments/by-tags")
            .with_body(serde_json::to_value(search)?);
        let payload = self.engine.execute(&request).await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn experiments_advanced(
        &self,
        search: &AdvancedExperimentSearch,
    ) -> Result<ExperimentSearchPage, ClientError> {
        let request = ApiRequest::post("/api/v1/search/experiments/advanced")
            .with_body(serde_json::to_value(search)?);
        let payload = self.engine.execute(&request).await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn experiment_types_by_description(
        &self,
        search: &TextSearch,
    ) -> Result<ExperimentTypeSearchPage, ClientError> {
        let request = ApiRequest::post("/api/v1/search/experiment-types/by-description")
            .with_body(serde_json::to_value(search)?);
        let payload = self.engine.execute(&request).await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn tags_by_name(&self, search: &TextSearch) -> Result<TagSearchPage, ClientError> {
        let request = ApiRequest::post("/api/v1/search/tags/by-name")
            .with_body(serde_json::to_value(search)?);
        let payload = self.engine.execute(&request).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Data rows across every experiment matching the tags.
    pub async fn experiment_data_by_tags(
        &self,
        search: &DataByTagsSearch,
    ) -> Result<DataByTagsPage, ClientError> {
        let request = ApiRequest::post("/api/v1/search/experiment-data/by-tags")
            .with_body(serde_json::to_value(search)?);
        let payload = self.engine.execute(&request).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Like [`experiment_data_by_tags`](Self::experiment_data_by_tags) but
    /// normalized into one table, useful for cross-experiment analysis.
    pub async fn experiment_data_by_tags_table(
        &self,
        search: &DataByTagsSearch,
    ) -> Result<Table, ClientError> {
        let page = self.experiment_data_by_tags(search).await?;
        Ok(normalize(&page.data)?)
    }
}
