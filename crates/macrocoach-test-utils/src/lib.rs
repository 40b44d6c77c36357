//! Shared test utilities for macrocoach integration tests.
//!
//! Two ways to stand in for a model backend:
//! - **In-process providers** ([`ScriptedProvider`], [`FnProvider`]) that
//!   register straight into a [`ModelGateway`] and never touch the network.
//! - **[`FakeProviderServer`]**, an HTTP server on a random local port that
//!   answers the real provider clients with queued responses and records
//!   what they sent.

pub mod fixtures;

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use macrocoach_core::gateway::{
    CompletionProvider, CompletionRequest, CompletionResult, GatewayError, ModelGateway,
};
use macrocoach_core::pipeline::{Pipeline, RetryPolicy};
use macrocoach_model::ProviderId;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// ---------------------------------------------------------------------------
// Scripted provider
// ---------------------------------------------------------------------------

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Successful call returning this text.
    Text(String),
    /// Successful call with nothing in it.
    Empty,
    /// Non-success HTTP status.
    Status(u16),
    /// Connection-level failure.
    Transport(String),
}

impl Outcome {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    fn into_result(self, provider: ProviderId) -> Result<CompletionResult, GatewayError> {
        match self {
            Self::Text(text) => Ok(CompletionResult::new(text)),
            Self::Empty => Err(GatewayError::EmptyResponse { provider }),
            Self::Status(status) => Err(GatewayError::Status {
                provider,
                status,
                body: String::new(),
            }),
            Self::Transport(message) => Err(GatewayError::Transport { provider, message }),
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    outcomes: VecDeque<Outcome>,
    prompts: Vec<String>,
}

/// Replays a fixed list of outcomes, one per call, and records prompts.
///
/// Clones share state, so a test can register one clone with a gateway and
/// inspect calls through another. Calls past the end of the script fail
/// with a transport error.
#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    id: ProviderId,
    script: Arc<Mutex<Script>>,
}

impl ScriptedProvider {
    pub fn new(id: ProviderId, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        Self {
            id,
            script: Arc::new(Mutex::new(Script {
                outcomes: outcomes.into_iter().collect(),
                prompts: Vec::new(),
            })),
        }
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.script.lock().expect("script lock").prompts.len()
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.script.lock().expect("script lock").prompts.clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, GatewayError> {
        let next = {
            let mut script = self.script.lock().expect("script lock");
            script.prompts.push(request.prompt.clone());
            script.outcomes.pop_front()
        };
        next.unwrap_or_else(|| Outcome::Transport("script exhausted".to_string()))
            .into_result(self.id)
    }
}

// ---------------------------------------------------------------------------
// Closure provider
// ---------------------------------------------------------------------------

/// Answers every call with a closure over the request, for tests whose
/// replies depend on the prompt (for example concurrent meal batches).
pub struct FnProvider<F> {
    id: ProviderId,
    respond: F,
}

impl<F> FnProvider<F>
where
    F: Fn(&CompletionRequest) -> Outcome + Send + Sync,
{
    pub fn new(id: ProviderId, respond: F) -> Self {
        Self { id, respond }
    }
}

#[async_trait]
impl<F> CompletionProvider for FnProvider<F>
where
    F: Fn(&CompletionRequest) -> Outcome + Send + Sync,
{
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResult, GatewayError> {
        (self.respond)(request).into_result(self.id)
    }
}

/// A pipeline over a single in-process provider with no retry delay.
pub fn pipeline_with(provider: impl CompletionProvider + 'static, max_retries: u32) -> Pipeline {
    let id = provider.id();
    let mut gateway = ModelGateway::new();
    gateway.register(provider);
    Pipeline::new(Arc::new(gateway), id, "test-model")
        .with_policy(RetryPolicy::immediate(max_retries))
}

// ---------------------------------------------------------------------------
// Fake HTTP provider
// ---------------------------------------------------------------------------

/// A request the fake server received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    /// Header names are lowercase.
    pub headers: HashMap<String, String>,
    pub body: Value,
}

#[derive(Clone, Default)]
struct ServerState {
    responses: Arc<Mutex<VecDeque<(u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Serves queued `(status, body)` pairs on any POST path.
///
/// Once the queue is empty every request gets a 500. The server task is
/// aborted on drop.
pub struct FakeProviderServer {
    addr: SocketAddr,
    state: ServerState,
    handle: JoinHandle<()>,
}

impl FakeProviderServer {
    pub async fn start() -> Self {
        let state = ServerState::default();
        let app = Router::new().fallback(record_and_reply).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake provider");
        let addr = listener.local_addr().expect("failed to read local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake provider crashed");
        });
        Self {
            addr,
            state,
            handle,
        }
    }

    /// Endpoint root to hand to a provider constructor.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.state
            .responses
            .lock()
            .expect("responses lock")
            .push_back((status, body.into()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }
}

impl Drop for FakeProviderServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn record_and_reply(
    State(state): State<ServerState>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let headers = headers
        .iter()
        .filter_map(|(k, v)| Some((k.as_str().to_owned(), v.to_str().ok()?.to_owned())))
        .collect();
    state.requests.lock().expect("requests lock").push(RecordedRequest {
        path: uri.path().to_owned(),
        headers,
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });

    let next = state.responses.lock().expect("responses lock").pop_front();
    let (status, body) = next.unwrap_or((500, "no response queued".to_string()));
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        body,
    )
}
