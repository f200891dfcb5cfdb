//! Client side of the contract: turns a line of user input into one proxy
//! call and keeps the resulting view state.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{info, warn};

use crate::{config::endpoint, models::{ErrorEnvelope, GenerationRequest, GenerationResult, InputError}};

pub const REJECTED_MESSAGE: &str = "Failed to fetch roast. The chef is on break.";
pub const FALLBACK_MESSAGE: &str = "Something went wrong.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Outcome {
    #[default]
    Idle,
    Success(GenerationResult),
    Failure(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientState {
    /// Advisory only; nothing stops a second submission while set.
    pub busy: bool,
    pub outcome: Outcome,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("proxy answered {status}")]
    Rejected { status: StatusCode, envelope: Option<ErrorEnvelope> },
    #[error("{0}")]
    Request(String),
}

impl ClientError {
    /// Text shown to the user. Rejections get a fixed line; anything else
    /// shows its own message when it has one.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Rejected { .. } => REJECTED_MESSAGE.to_string(),
            ClientError::Request(msg) if !msg.trim().is_empty() => msg.clone(),
            ClientError::Request(_) => FALLBACK_MESSAGE.to_string(),
        }
    }
}

#[async_trait]
pub trait ProxyTransport: Send + Sync {
    async fn call(&self, request: &GenerationRequest) -> Result<GenerationResult, ClientError>;
}

pub struct HttpProxyTransport {
    client: Client,
    endpoint: String,
}

impl HttpProxyTransport {
    pub fn new(proxy_url: &str) -> Self {
        Self { client: Client::new(), endpoint: endpoint(proxy_url) }
    }
}

#[async_trait]
impl ProxyTransport for HttpProxyTransport {
    async fn call(&self, request: &GenerationRequest) -> Result<GenerationResult, ClientError> {
        let response = self.client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let envelope = response.json::<ErrorEnvelope>().await.ok();
            if let Some(env) = &envelope {
                warn!(%status, category = %env.error, "Proxy rejected request: {}", env.details);
            }
            return Err(ClientError::Rejected { status, envelope });
        }

        response.json::<GenerationResult>().await.map_err(|e| ClientError::Request(e.to_string()))
    }
}

pub struct Session<T> {
    transport: T,
    state: ClientState,
}

impl<T: ProxyTransport> Session<T> {
    pub fn new(transport: T) -> Self {
        Self { transport, state: ClientState::default() }
    }

    pub fn state(&self) -> &ClientState { &self.state }

    /// Validate input and enter the in-flight state. On blank input the
    /// state is left exactly as it was.
    pub fn begin(&mut self, ingredients: &str) -> Result<GenerationRequest, InputError> {
        let request = GenerationRequest::new(ingredients)?;
        self.state = ClientState { busy: true, outcome: Outcome::Idle };
        Ok(request)
    }

    pub fn finish(&mut self, result: Result<GenerationResult, ClientError>) {
        self.state.busy = false;
        self.state.outcome = match result {
            Ok(result) => Outcome::Success(result),
            Err(e) => Outcome::Failure(e.user_message()),
        };
    }

    /// Returns whether a call was issued.
    pub async fn submit(&mut self, ingredients: &str) -> bool {
        let request = match self.begin(ingredients) {
            Ok(request) => request,
            Err(e) => {
                info!("Not submitting: {}", e);
                return false;
            }
        };
        let result = self.transport.call(&request).await;
        self.finish(result);
        true
    }
}

/// Plain-text view of the current state.
pub fn render(state: &ClientState) -> String {
    if state.busy {
        return "Roasting...".to_string();
    }
    match &state.outcome {
        Outcome::Idle => String::new(),
        Outcome::Failure(msg) => format!("Error: {}", msg),
        Outcome::Success(result) => {
            let mut out = format!("THE ROAST\n{}\n\n{}\n\nIngredients:\n", result.roast, result.recipe_name);
            for item in &result.ingredients_list {
                out.push_str(&format!("  - {}\n", item));
            }
            out.push_str("\nInstructions:\n");
            for (i, step) in result.instructions.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, step));
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backend::{BackendClient, mock::MockBackend}, build_router, config::ProxyConfig, routes::AppState};
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};

    fn omelette() -> GenerationResult {
        GenerationResult {
            roast: "Egg and milk. Groundbreaking.".into(),
            recipe_name: "Scrambled Apology".into(),
            ingredients_list: vec!["egg".into(), "milk".into()],
            instructions: vec!["Crack egg".into(), "Add milk".into(), "Stir".into()],
        }
    }

    struct CountingTransport {
        calls: AtomicUsize,
        reply: fn() -> Result<GenerationResult, ClientError>,
    }

    impl CountingTransport {
        fn new(reply: fn() -> Result<GenerationResult, ClientError>) -> Self {
            Self { calls: AtomicUsize::new(0), reply }
        }
    }

    #[async_trait]
    impl ProxyTransport for CountingTransport {
        async fn call(&self, _request: &GenerationRequest) -> Result<GenerationResult, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.reply)()
        }
    }

    #[tokio::test]
    async fn blank_input_issues_no_call() {
        let mut session = Session::new(CountingTransport::new(|| Ok(omelette())));
        for input in ["", "   ", "\n\t"] {
            assert!(!session.submit(input).await);
        }
        assert_eq!(session.transport.calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.state(), &ClientState::default());
    }

    #[tokio::test]
    async fn input_issues_exactly_one_call() {
        let mut session = Session::new(CountingTransport::new(|| Ok(omelette())));
        assert!(session.submit("egg, milk").await);
        assert_eq!(session.transport.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.state(), &ClientState { busy: false, outcome: Outcome::Success(omelette()) });
    }

    #[test]
    fn begin_clears_previous_outcome_and_sets_busy() {
        let mut session = Session::new(CountingTransport::new(|| Ok(omelette())));
        session.finish(Err(ClientError::Request("boom".into())));
        assert_eq!(session.state().outcome, Outcome::Failure("boom".into()));

        let request = session.begin("leftover rice").unwrap();
        assert_eq!(request.ingredients, "leftover rice");
        assert_eq!(session.state(), &ClientState { busy: true, outcome: Outcome::Idle });
        assert_eq!(render(session.state()), "Roasting...");
    }

    #[test]
    fn blank_begin_keeps_previous_result() {
        let mut session = Session::new(CountingTransport::new(|| Ok(omelette())));
        session.finish(Ok(omelette()));
        assert_eq!(session.begin("  "), Err(InputError::EmptyIngredients));
        assert_eq!(session.state().outcome, Outcome::Success(omelette()));
    }

    #[tokio::test]
    async fn rejection_uses_fixed_message() {
        let mut session = Session::new(CountingTransport::new(|| Err(ClientError::Rejected {
            status: StatusCode::SERVICE_UNAVAILABLE,
            envelope: Some(ErrorEnvelope { error: "backend_error".into(), details: "model overloaded".into() }),
        })));
        session.submit("egg").await;
        assert_eq!(session.state().outcome, Outcome::Failure(REJECTED_MESSAGE.into()));
        assert!(!session.state().busy);
    }

    #[tokio::test]
    async fn empty_failure_message_falls_back() {
        let mut session = Session::new(CountingTransport::new(|| Err(ClientError::Request(String::new()))));
        session.submit("egg").await;
        assert_eq!(session.state().outcome, Outcome::Failure(FALLBACK_MESSAGE.into()));
    }

    #[test]
    fn render_numbers_steps_in_order() {
        let state = ClientState { busy: false, outcome: Outcome::Success(omelette()) };
        let text = render(&state);
        assert!(text.contains("  - egg\n  - milk\n"), "{}", text);
        assert!(text.contains("  1. Crack egg\n  2. Add milk\n  3. Stir\n"), "{}", text);
        assert_eq!(render(&ClientState::default()), "");
    }

    #[test]
    fn render_full_success_view() {
        let state = ClientState { busy: false, outcome: Outcome::Success(omelette()) };
        assert_eq!(
            render(&state),
            "THE ROAST\nEgg and milk. Groundbreaking.\n\nScrambled Apology\n\nIngredients:\n  - egg\n  - milk\n\nInstructions:\n  1. Crack egg\n  2. Add milk\n  3. Stir\n"
        );
        let failed = ClientState { busy: false, outcome: Outcome::Failure(FALLBACK_MESSAGE.into()) };
        assert_eq!(render(&failed), "Error: Something went wrong.");
    }

    async fn start_proxy(backend_url: &str) -> String {
        let cfg = ProxyConfig { backend_url: backend_url.to_string(), ..ProxyConfig::default() };
        let app = build_router(AppState { backend: Arc::new(BackendClient::new(&cfg).unwrap()) });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move { axum::serve(listener, app).await.ok(); });
        url
    }

    #[tokio::test]
    async fn round_trip_through_proxy_keeps_sequences() {
        let body = serde_json::to_string(&omelette()).unwrap();
        let backend = MockBackend::start(StatusCode::OK, body).await;
        let proxy = start_proxy(&backend.url).await;

        let mut session = Session::new(HttpProxyTransport::new(&proxy));
        assert!(session.submit("egg, milk").await);
        match &session.state().outcome {
            Outcome::Success(result) => {
                assert_eq!(result.ingredients_list, vec!["egg", "milk"]);
                assert_eq!(result.instructions, vec!["Crack egg", "Add milk", "Stir"]);
            }
            other => panic!("expected success, got {:?}", other),
        }
        assert_eq!(backend.received(), vec![bytes::Bytes::from_static(br#"{"ingredients":"egg, milk"}"#)]);
    }

    #[tokio::test]
    async fn backend_failure_through_proxy_becomes_failure_state() {
        let backend = MockBackend::start(StatusCode::SERVICE_UNAVAILABLE, "model overloaded").await;
        let proxy = start_proxy(&backend.url).await;

        let transport = HttpProxyTransport::new(&proxy);
        let err = transport.call(&GenerationRequest::new("egg").unwrap()).await.unwrap_err();
        match &err {
            ClientError::Rejected { status, envelope } => {
                assert_eq!(*status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(envelope.as_ref().map(|e| e.details.as_str()), Some("model overloaded"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }

        let mut session = Session::new(transport);
        session.submit("egg").await;
        assert_eq!(session.state().outcome, Outcome::Failure(REJECTED_MESSAGE.into()));
    }
}
