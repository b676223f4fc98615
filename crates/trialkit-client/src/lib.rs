//! # Trialkit Client
//!
//! Client library for the trialkit experiment-data service: authenticated
//! HTTP access, transparent retry with exponential backoff, a typed failure
//! taxonomy, and analysis-ready tabular results.
//!
//! ## Overview
//!
//! This crate provides the foundational components of the client:
//!
//! - **Request engine** with bounded retries, backoff jitter, and
//!   rate-limit awareness
//! - **Failure taxonomy** mapping HTTP statuses to typed errors
//! - **Version compatibility** checks over request/response headers
//! - **Resource wrappers** for experiments, experiment types, tags,
//!   experiment data, and search
//! - **Tabular results** via the re-exported `trialkit-frame` types
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Top-level [`TrialClient`] façade |
//! | [`config`] | Connection and retry configuration |
//! | [`engine`] | Request engine and retry loop |
//! | [`error`] | Failure taxonomy and validation errors |
//! | [`models`] | Wire models and validated payloads |
//! | [`resources`] | Per-resource API wrappers |
//! | [`retry`] | Backoff policy |
//! | [`transport`] | HTTP transport abstraction |
//! | [`version`] | Client/server version compatibility |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trialkit_client::{ClientConfig, TrialClient};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TrialClient::new(&ClientConfig::new("api-key"));
//!
//!     let experiment = Uuid::parse_str("0192a0c6-2f2b-7e8e-b9d1-54a1c8d2e9aa")?;
//!     let table = client.data().fetch_all_table(&experiment, 1000).await?;
//!
//!     println!("{} rows, columns: {:?}", table.len(), table.column_names());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Failed calls return [`ApiError`] values that carry everything needed to
//! decide retryability without re-inspecting the response:
//!
//! ```rust
//! use trialkit_client::ApiError;
//!
//! fn handle_error(error: ApiError) {
//!     match error {
//!         ApiError::RateLimit { retry_after, .. } => {
//!             // Wait and retry (the engine already did, up to its budget)
//!             let _ = retry_after;
//!         }
//!         ApiError::Authentication { .. } => {
//!             // Check TRIALKIT_API_KEY
//!         }
//!         ApiError::NotFound { .. } => {
//!             // Check the experiment id
//!         }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! Retryable failures (429, 500/502/503/504, timeouts, connection resets)
//! are retried transparently up to the configured attempt budget; terminal
//! failures propagate immediately. Version skew between client and server
//! is reported through a pluggable [`VersionObserver`] and never fails a
//! request.
//!
//! ## Security
//!
//! - The API key is read from the environment or passed explicitly, and is
//!   only ever written into the `authorization` header
//! - Payload validation runs client-side before any bytes leave the host

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod resources;
pub mod retry;
pub mod transport;
pub mod version;

// Re-export commonly used types at crate root for convenience

pub use client::TrialClient;
pub use config::{ClientConfig, API_KEY_ENV, API_URL_ENV};
pub use engine::{ApiRequest, RequestEngine};
pub use error::{classify, ApiError, ClientError, ValidationError};
pub use models::{
    AdvancedExperimentSearch, ColumnSpec, DataByTagsPage, DataByTagsSearch, DataCount, DataQuery,
    DataRowDraft, DataRowPatch, Experiment, ExperimentDraft, ExperimentFilter, ExperimentPatch,
    ExperimentSearchPage, ExperimentTagSearch, ExperimentType, ExperimentTypeDraft,
    ExperimentTypePatch, ExperimentTypeSearchPage, PageInfo, RowDeleteReceipt, RowFilter,
    SchemaDefinition, ServerVersion, Tag, TagDraft, TagPatch, TagSearchPage, TextSearch,
};
pub use resources::{
    ExperimentDataResource, ExperimentTypesResource, ExperimentsResource, SearchResource,
    TagsResource,
};
pub use retry::RetryPolicy;
pub use transport::{
    HttpMethod, NoopTransport, ReqwestTransport, Transport, TransportError, TransportRequest,
    TransportResponse,
};
pub use version::{
    compatibility_warning, is_compatible, parse_version, NoopVersionObserver, VersionObserver,
    VersionTriple, API_VERSION_HEADER, CLIENT_VERSION, CLIENT_VERSION_HEADER,
};

// Frame types (re-exported from trialkit-frame)
pub use trialkit_frame::{
    is_reserved_column, normalize, records_to_table, CellValue, Column, ColumnType, DataRow,
    FrameError, Table, UtcDateTime, MANDATORY_COLUMNS,
};
