use std::sync::Arc;

use serde_json::Value;

use crate::config::ClientConfig;
use crate::engine::{ApiRequest, RequestEngine};
use crate::error::{ApiError, ClientError};
use crate::models::ServerVersion;
use crate::resources::{
    ExperimentDataResource, ExperimentTypesResource, ExperimentsResource, SearchResource,
    TagsResource,
};
use crate::transport::{ReqwestTransport, Transport};
use crate::version::{NoopVersionObserver, VersionObserver};

/// Top-level client for the experiment-data service.
///
/// Resource accessors borrow the client, so one client can serve many
/// concurrent calls; cloning is cheap and shares the underlying transport.
/// The connection pool is released when the last clone is dropped.
#[derive(Clone)]
pub struct TrialClient {
    engine: RequestEngine,
}

impl TrialClient {
    /// Builds a client with the production HTTP transport.
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_parts(
            config,
            Arc::new(ReqwestTransport::new()),
            Arc::new(NoopVersionObserver),
        )
    }

    /// Builds a client from `TRIALKIT_API_KEY` / `TRIALKIT_API_URL`.
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::new(&ClientConfig::from_env()?))
    }

    /// Builds a client over a custom transport, keeping the default
    /// observer. Used by tests and embedders with their own HTTP stack.
    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self::with_parts(config, transport, Arc::new(NoopVersionObserver))
    }

    /// Builds a client with both a custom transport and a custom version
    /// observer.
    pub fn with_parts(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        observer: Arc<dyn VersionObserver>,
    ) -> Self {
        Self {
            engine: RequestEngine::new(config, transport, observer),
        }
    }

    pub fn tags(&self) -> TagsResource<'_> {
        TagsResource::new(&self.engine)
    }

    pub fn experiment_types(&self) -> ExperimentTypesResource<'_> {
        ExperimentTypesResource::new(&self.engine)
    }

    pub fn experiments(&self) -> ExperimentsResource<'_> {
        ExperimentsResource::new(&self.engine)
    }

    pub fn data(&self) -> ExperimentDataResource<'_> {
        ExperimentDataResource::new(&self.engine)
    }

    pub fn search(&self) -> SearchResource<'_> {
        SearchResource::new(&self.engine)
    }

    /// Service health probe.
    pub async fn health(&self) -> Result<Value, ApiError> {
        self.engine.execute(&ApiRequest::get("/health")).await
    }

    /// Server version and compatibility report.
    pub async fn server_version(&self) -> Result<ServerVersion, ClientError> {
        let payload = self.engine.execute(&ApiRequest::get("/version")).await?;
        Ok(serde_json::from_value(payload)?)
    }
}
