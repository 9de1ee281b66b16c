//! Mock config transport for testing.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chatgate_core::{ConfigTransport, Error, Result, ServerConfig};
use tokio::sync::Notify;

/// Transport that returns a canned outcome instead of calling a server.
///
/// Clones share the call counter and gate, so a test can keep a clone to
/// inspect after handing the transport to a controller.
#[derive(Clone)]
pub struct MockConfigTransport {
    outcome: Arc<MockOutcome>,
    calls: Arc<AtomicUsize>,
    gate: Option<Arc<Notify>>,
}

enum MockOutcome {
    Config(ServerConfig),
    Body(String),
    Fail(String),
}

impl MockConfigTransport {
    fn new(outcome: MockOutcome) -> Self {
        Self {
            outcome: Arc::new(outcome),
            calls: Arc::new(AtomicUsize::new(0)),
            gate: None,
        }
    }

    /// Creates a mock that answers with `config`.
    pub fn with_config(config: ServerConfig) -> Self {
        Self::new(MockOutcome::Config(config))
    }

    /// Creates a mock that answers with a raw response body, parsed on
    /// every call like a real transport would.
    pub fn with_body(body: impl Into<String>) -> Self {
        Self::new(MockOutcome::Body(body.into()))
    }

    /// Creates a mock whose calls fail with a transport error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockOutcome::Fail(message.into()))
    }

    /// Hold every call until [`release`](Self::release) is called.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    /// Let one held call (or the next one) complete.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigTransport for MockConfigTransport {
    async fn fetch_config(&self) -> Result<ServerConfig> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match self.outcome.as_ref() {
            MockOutcome::Config(config) => Ok(config.clone()),
            MockOutcome::Body(body) => ServerConfig::from_json(body),
            MockOutcome::Fail(message) => Err(Error::transport(message.clone())),
        }
    }
}
