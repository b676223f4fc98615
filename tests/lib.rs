// Test support for trialkit behavior tests: scripted transports and a
// recording version observer.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

pub use trialkit_client::{
    ApiError, ApiRequest, ClientConfig, RequestEngine, TrialClient, Transport, TransportError,
    TransportRequest, TransportResponse, VersionObserver,
};

/// Transport that replays a queue of canned outcomes and records every
/// request it receives. Once the queue is exhausted further requests fail
/// terminally, so tests notice unexpected extra attempts.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<TransportResponse, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(responses: Vec<TransportResponse>) -> Self {
        Self::new(responses.into_iter().map(Ok).collect())
    }

    pub fn recorded_requests(&self) -> Vec<TransportRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .len()
    }
}

impl Transport for ScriptedTransport {
    fn execute<'a>(
        &'a self,
        request: TransportRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);
        let outcome = self
            .responses
            .lock()
            .expect("response queue should not be poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::terminal("transport script exhausted")));
        Box::pin(async move { outcome })
    }
}

/// Observer that records every version observation for later assertions.
#[derive(Default)]
pub struct RecordingObserver {
    observations: Mutex<Vec<(String, String, Option<String>)>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observations(&self) -> Vec<(String, String, Option<String>)> {
        self.observations
            .lock()
            .expect("observation store should not be poisoned")
            .clone()
    }
}

impl VersionObserver for RecordingObserver {
    fn version_observed(&self, client_version: &str, server_version: &str, warning: Option<&str>) {
        self.observations
            .lock()
            .expect("observation store should not be poisoned")
            .push((
                client_version.to_owned(),
                server_version.to_owned(),
                warning.map(str::to_owned),
            ));
    }
}

/// Config pointed at a fake host with the default retry policy.
pub fn test_config() -> ClientConfig {
    ClientConfig::new("test-key").with_base_url("https://lab.example.test")
}

/// Engine over a scripted transport with the default observer.
pub fn engine_over(transport: Arc<ScriptedTransport>) -> RequestEngine {
    use trialkit_client::NoopVersionObserver;
    RequestEngine::new(&test_config(), transport, Arc::new(NoopVersionObserver))
}

/// Client over a scripted transport.
pub fn client_over(transport: Arc<ScriptedTransport>) -> TrialClient {
    TrialClient::with_transport(&test_config(), transport)
}

/// A JSON error response with the given status and body.
pub fn error_response(status: u16, body: &str) -> TransportResponse {
    TransportResponse::new(status, body).with_header("content-type", "application/json")
}
