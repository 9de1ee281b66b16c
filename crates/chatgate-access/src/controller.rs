//! The access controller.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chatgate_core::{
    ACCESS_STORE_KEY, ACCESS_STORE_VERSION, AccessState, ConfigListener, ConfigTransport,
    GateConfig, HeaderProvider, PersistentStore, Result,
};
use chatgate_http::{CredentialHeaders, HttpConfigTransport};
use chatgate_store::{JsonFileStore, MemoryStore};
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Progress of the one-shot server config fetch.
///
/// Moves `NotFetched -> Fetching -> Done` and never goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStatus {
    /// No fetch has been started.
    NotFetched,
    /// A request is in flight.
    Fetching,
    /// The fetch finished, successfully or not.
    Done,
}

/// Credentials and server-declared access policy for one client.
///
/// Cloning is cheap and clones share state, including the fetch status.
#[derive(Clone)]
pub struct AccessController {
    shared: Arc<Shared>,
}

struct Shared {
    key: String,
    state: Arc<Mutex<AccessState>>,
    store: Arc<dyn PersistentStore>,
    transport: Arc<dyn ConfigTransport>,
    listeners: Vec<Arc<dyn ConfigListener>>,
    status: watch::Sender<FetchStatus>,
}

fn lock(state: &Mutex<AccessState>) -> MutexGuard<'_, AccessState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AccessController {
    /// Start building a controller persisted in `store`.
    pub fn builder(store: impl PersistentStore + 'static) -> AccessControllerBuilder {
        AccessControllerBuilder::new(Arc::new(store))
    }

    /// Build a controller from file/env configuration.
    ///
    /// Uses a [`JsonFileStore`] when `store.path` is set and a
    /// [`MemoryStore`] otherwise. Server config is fetched over HTTP with
    /// auth headers built from the controller's current credentials.
    pub fn connect(
        config: &GateConfig,
        listeners: Vec<Arc<dyn ConfigListener>>,
    ) -> Result<Self> {
        let store: Arc<dyn PersistentStore> = match &config.store.path {
            Some(dir) => Arc::new(JsonFileStore::new(dir)?),
            None => Arc::new(MemoryStore::new()),
        };

        let mut builder = AccessControllerBuilder::new(store).with_key(config.store.key.clone());
        for listener in listeners {
            builder = builder.with_listener_arc(listener);
        }

        let url = config.config_url();
        Ok(builder.build_with(|credentials| HttpConfigTransport::new(url, credentials)))
    }

    /// Namespaced key the state is persisted under.
    pub fn key(&self) -> &str {
        &self.shared.key
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AccessState {
        lock(&self.shared.state).clone()
    }

    /// Current progress of the server config fetch.
    pub fn fetch_status(&self) -> FetchStatus {
        *self.shared.status.borrow()
    }

    // ------------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------------

    /// Set the personal bearer token.
    pub fn update_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.update("token", |state| state.token = token);
    }

    /// Set the access code.
    pub fn update_code(&self, code: impl Into<String>) {
        let code = code.into();
        self.update("accessCode", |state| state.access_code = code);
    }

    /// Set the Midjourney credential.
    pub fn update_mj_key(&self, key: impl Into<String>) {
        let key = key.into();
        self.update("midJourneyKey", |state| state.mid_journey_key = key);
    }

    /// Set the Midjourney endpoint.
    pub fn update_api_url(&self, url: impl Into<String>) {
        let url = url.into();
        self.update("midJourneyAPIURL", |state| state.mid_journey_api_url = url);
    }

    /// Toggle Midjourney mode.
    pub fn update_mj_mode(&self, enabled: bool) {
        self.update("mjMode", |state| state.mj_mode = enabled);
    }

    /// Clear the user-supplied fields and persist.
    ///
    /// Server-declared fields keep the values of the last fetch, which is
    /// not repeated.
    pub fn reset(&self) {
        let mut state = lock(&self.shared.state);
        state.clear_user_fields();
        self.shared.persist(&state);
        tracing::debug!(key = %self.shared.key, "Access credentials reset");
    }

    fn update(&self, field: &str, apply: impl FnOnce(&mut AccessState)) {
        let mut state = lock(&self.shared.state);
        apply(&mut state);
        self.shared.persist(&state);
        tracing::debug!(key = %self.shared.key, field, "Access state updated");
    }

    // ------------------------------------------------------------------------
    // Readers
    // ------------------------------------------------------------------------

    /// Whether the server requires an access code.
    ///
    /// Starts the server config fetch if it has not run yet, but answers
    /// from the state known right now without waiting for it.
    pub fn enabled_access_control(&self) -> bool {
        self.fetch_config();
        lock(&self.shared.state).need_code
    }

    /// Whether the current user may use the service.
    ///
    /// True when a token is set, an access code is set, or the server does
    /// not require a code. Starts the server config fetch like
    /// [`enabled_access_control`](Self::enabled_access_control).
    pub fn is_authorized(&self) -> bool {
        self.fetch_config();

        let state = lock(&self.shared.state);
        state.has_token() || state.has_access_code() || !state.need_code
    }

    // ------------------------------------------------------------------------
    // Server config
    // ------------------------------------------------------------------------

    /// Start the server config fetch unless one was already started.
    ///
    /// The request runs on the current Tokio runtime and this call returns
    /// immediately. Failures are logged and leave state untouched. Outside a
    /// runtime nothing happens and the status stays
    /// [`FetchStatus::NotFetched`], so the first call made inside one
    /// performs the fetch.
    pub fn fetch_config(&self) {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::debug!(error = %e, "No async runtime yet, deferring server config fetch");
                return;
            }
        };

        let claimed = self.shared.status.send_if_modified(|status| {
            if *status == FetchStatus::NotFetched {
                *status = FetchStatus::Fetching;
                true
            } else {
                false
            }
        });
        if !claimed {
            return;
        }

        let done = DoneGuard(Arc::clone(&self.shared));
        let shared = Arc::clone(&self.shared);
        handle.spawn(async move {
            let _done = done;
            shared.run_fetch().await;
        });
    }

    /// Wait until the server config fetch has finished.
    ///
    /// Starts the fetch first if nothing has triggered it yet.
    pub async fn wait_for_config(&self) {
        self.fetch_config();
        let mut rx = self.shared.status.subscribe();
        // The sender lives in `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|status| *status == FetchStatus::Done).await;
    }
}

impl fmt::Debug for AccessController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessController")
            .field("key", &self.shared.key)
            .field("fetch_status", &self.fetch_status())
            .field("listeners", &self.shared.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Shared {
    fn persist(&self, state: &AccessState) {
        if let Err(e) = self.store.save(&self.key, ACCESS_STORE_VERSION, state) {
            tracing::warn!(key = %self.key, error = %e, "Failed to persist access state");
        }
    }

    async fn run_fetch(&self) {
        match self.transport.fetch_config().await {
            Ok(config) => {
                tracing::info!(
                    need_code = ?config.need_code,
                    enable_gpt4 = config.enable_gpt4,
                    "Got config from server"
                );

                {
                    let mut state = lock(&self.state);
                    config.merge_into(&mut state);
                    self.persist(&state);
                }

                for listener in &self.listeners {
                    listener.on_config_loaded(&config);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch server config");
            }
        }
    }
}

/// Marks the fetch as done when dropped, including on panic.
struct DoneGuard(Arc<Shared>);

impl Drop for DoneGuard {
    fn drop(&mut self) {
        self.0.status.send_replace(FetchStatus::Done);
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`AccessController`].
///
/// Loads the persisted state once, in [`build`](Self::build).
pub struct AccessControllerBuilder {
    store: Arc<dyn PersistentStore>,
    key: String,
    listeners: Vec<Arc<dyn ConfigListener>>,
}

impl AccessControllerBuilder {
    fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self {
            store,
            key: ACCESS_STORE_KEY.to_string(),
            listeners: Vec::new(),
        }
    }

    /// Persist under `key` instead of the default namespaced key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Notify `listener` after a successful fetch.
    pub fn with_listener(self, listener: impl ConfigListener + 'static) -> Self {
        self.with_listener_arc(Arc::new(listener))
    }

    /// Notify a shared `listener` after a successful fetch.
    pub fn with_listener_arc(mut self, listener: Arc<dyn ConfigListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Build the controller with the given transport.
    pub fn build(self, transport: impl ConfigTransport + 'static) -> AccessController {
        self.build_with(|_| transport)
    }

    /// Build the controller with a transport that needs the live
    /// credentials, e.g. for auth headers.
    pub fn build_with<T, F>(self, make_transport: F) -> AccessController
    where
        T: ConfigTransport + 'static,
        F: FnOnce(LiveCredentials) -> T,
    {
        let initial = match self.store.load(&self.key, ACCESS_STORE_VERSION) {
            Ok(Some(state)) => {
                tracing::debug!(key = %self.key, "Rehydrated access state");
                state
            }
            Ok(None) => AccessState::default(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to load access state, using defaults");
                AccessState::default()
            }
        };

        let state = Arc::new(Mutex::new(initial));
        let transport = make_transport(LiveCredentials {
            state: Arc::clone(&state),
        });
        let (status, _) = watch::channel(FetchStatus::NotFetched);

        AccessController {
            shared: Arc::new(Shared {
                key: self.key,
                state,
                store: self.store,
                transport: Arc::new(transport),
                listeners: self.listeners,
                status,
            }),
        }
    }
}

/// Read-only view of a controller's credentials.
///
/// Implements [`HeaderProvider`] with [`CredentialHeaders`] built from the
/// credentials at the time of each request.
#[derive(Clone)]
pub struct LiveCredentials {
    state: Arc<Mutex<AccessState>>,
}

impl LiveCredentials {
    /// Current token and access code.
    pub fn snapshot(&self) -> (String, String) {
        let state = lock(&self.state);
        (state.token.clone(), state.access_code.clone())
    }
}

impl HeaderProvider for LiveCredentials {
    fn headers(&self) -> Vec<(String, String)> {
        CredentialHeaders::from_state(&lock(&self.state)).headers()
    }
}

// ============================================================================
// Tests
// ============================================================================
