//! Collaborator traits.
//!
//! The access controller is wired to its environment through these traits:
//! where state is persisted, how server config is fetched, and what happens
//! when it arrives. Host applications pick the implementations.

use async_trait::async_trait;

use crate::Result;
use crate::response::ServerConfig;
use crate::state::AccessState;

/// Versioned key-value persistence for [`AccessState`].
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::Mutex;
/// use chatgate_core::{AccessState, PersistentStore, Result};
///
/// #[derive(Default)]
/// struct Scratch(Mutex<HashMap<String, AccessState>>);
///
/// impl PersistentStore for Scratch {
///     fn load(&self, key: &str, _version: u32) -> Result<Option<AccessState>> {
///         Ok(self.0.lock().unwrap().get(key).cloned())
///     }
///
///     fn save(&self, key: &str, _version: u32, state: &AccessState) -> Result<()> {
///         self.0.lock().unwrap().insert(key.to_string(), state.clone());
///         Ok(())
///     }
/// }
/// ```
pub trait PersistentStore: Send + Sync {
    /// Load the state stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing is stored, or when the stored document
    /// was written with a different `version`.
    fn load(&self, key: &str, version: u32) -> Result<Option<AccessState>>;

    /// Persist `state` under `key`, tagged with `version`.
    fn save(&self, key: &str, version: u32, state: &AccessState) -> Result<()>;
}

/// Retrieves server-declared configuration.
#[async_trait]
pub trait ConfigTransport: Send + Sync {
    /// Perform one request to the config endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`](crate::Error::Transport) on network or
    /// HTTP failure and [`Error::Parse`](crate::Error::Parse) when the body
    /// is not a JSON object.
    async fn fetch_config(&self) -> Result<ServerConfig>;
}

/// Supplies request headers for the config call (auth and the like).
pub trait HeaderProvider: Send + Sync {
    /// Headers to attach, as name/value pairs.
    fn headers(&self) -> Vec<(String, String)>;
}

impl<F> HeaderProvider for F
where
    F: Fn() -> Vec<(String, String)> + Send + Sync,
{
    fn headers(&self) -> Vec<(String, String)> {
        self()
    }
}

/// External mutable tables updated when server config arrives.
pub trait SideEffectRegistry: Send + Sync {
    /// Mark every model whose name starts with `prefix` as (un)available.
    fn set_model_family_availability(&self, prefix: &str, available: bool);

    /// Replace the content of the default greeting message.
    fn set_default_greeting(&self, text: &str);
}

/// Notified once server config has been merged into state.
pub trait ConfigListener: Send + Sync {
    /// Called with the successfully parsed response.
    fn on_config_loaded(&self, config: &ServerConfig);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(provider: &dyn HeaderProvider) -> Vec<(String, String)> {
        provider.headers()
    }

    #[test]
    fn test_closure_header_provider() {
        let provider = || vec![("x-client".to_string(), "chatgate".to_string())];
        assert_eq!(
            collect(&provider),
            vec![("x-client".to_string(), "chatgate".to_string())]
        );
    }
}
