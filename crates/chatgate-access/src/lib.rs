//! Access control for chat clients.
//!
//! [`AccessController`] is the single source of truth for a user's
//! credentials and the server-declared access policy. Reading the
//! authorization state triggers one background fetch of the server config
//! per controller; the fetch result is merged into persisted state and handed
//! to [`ConfigListener`](chatgate_core::ConfigListener)s such as
//! [`RegistryListener`].
//!
//! # Example
//!
//! ```
//! use chatgate_access::{AccessController, InMemoryRegistry, MockConfigTransport, RegistryListener};
//! use chatgate_core::ServerConfig;
//! use chatgate_store::MemoryStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry = InMemoryRegistry::with_defaults();
//! let controller = AccessController::builder(MemoryStore::new())
//!     .with_listener(RegistryListener::new(registry.clone()))
//!     .build(MockConfigTransport::with_config(ServerConfig {
//!         need_code: Some(false),
//!         ..ServerConfig::default()
//!     }));
//!
//! // Defaults apply until the fetch completes.
//! assert!(!controller.is_authorized());
//!
//! controller.wait_for_config().await;
//! assert!(controller.is_authorized());
//! assert!(!registry.is_available("gpt-4"));
//! # }
//! ```

mod controller;
pub mod logging;
mod mock;
mod registry;

pub use controller::{AccessController, AccessControllerBuilder, FetchStatus, LiveCredentials};
pub use mock::MockConfigTransport;
pub use registry::{
    DEFAULT_GREETING, InMemoryRegistry, ModelEntry, RegistryListener, default_models,
};
