//! Model and greeting registries updated from server config.

use std::sync::{Arc, PoisonError, RwLock};

use chatgate_core::response::GPT4_MODEL_PREFIX;
use chatgate_core::{ConfigListener, ServerConfig, SideEffectRegistry};

/// Greeting shown before the user sends a first message.
pub const DEFAULT_GREETING: &str = "Hello! How can I help you today?";

/// One selectable model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    /// Model identifier, e.g. `gpt-4-32k`.
    pub name: String,
    /// Whether the model is offered to the user.
    pub available: bool,
}

impl ModelEntry {
    /// An available model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            available: true,
        }
    }
}

/// The stock model table, everything available.
pub fn default_models() -> Vec<ModelEntry> {
    [
        "gpt-4",
        "gpt-4-0314",
        "gpt-4-0613",
        "gpt-4-32k",
        "gpt-4-32k-0314",
        "gpt-4-32k-0613",
        "gpt-3.5-turbo",
        "gpt-3.5-turbo-0301",
        "gpt-3.5-turbo-0613",
        "gpt-3.5-turbo-16k",
        "gpt-3.5-turbo-16k-0613",
    ]
    .into_iter()
    .map(ModelEntry::new)
    .collect()
}

/// Model table and default greeting held in memory.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    models: Arc<RwLock<Vec<ModelEntry>>>,
    greeting: Arc<RwLock<String>>,
}

impl InMemoryRegistry {
    /// Creates a registry with the given tables.
    pub fn new(models: Vec<ModelEntry>, greeting: impl Into<String>) -> Self {
        Self {
            models: Arc::new(RwLock::new(models)),
            greeting: Arc::new(RwLock::new(greeting.into())),
        }
    }

    /// Creates a registry with [`default_models`] and [`DEFAULT_GREETING`].
    pub fn with_defaults() -> Self {
        Self::new(default_models(), DEFAULT_GREETING)
    }

    /// Snapshot of the model table.
    pub fn models(&self) -> Vec<ModelEntry> {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether `name` is listed and available.
    pub fn is_available(&self, name: &str) -> bool {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|m| m.name == name && m.available)
    }

    /// Current default greeting.
    pub fn greeting(&self) -> String {
        self.greeting
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SideEffectRegistry for InMemoryRegistry {
    fn set_model_family_availability(&self, prefix: &str, available: bool) {
        let mut models = self.models.write().unwrap_or_else(PoisonError::into_inner);
        for model in models.iter_mut().filter(|m| m.name.starts_with(prefix)) {
            model.available = available;
        }
    }

    fn set_default_greeting(&self, text: &str) {
        *self.greeting.write().unwrap_or_else(PoisonError::into_inner) = text.to_string();
    }
}

/// Applies server config to a [`SideEffectRegistry`].
///
/// - `enableGPT4` false or absent: the `gpt-4` family becomes unavailable.
/// - non-empty `botHello`: replaces the default greeting.
#[derive(Debug, Clone)]
pub struct RegistryListener<R> {
    registry: R,
}

impl<R: SideEffectRegistry> RegistryListener<R> {
    /// Wraps `registry`.
    pub fn new(registry: R) -> Self {
        Self { registry }
    }
}

impl<R: SideEffectRegistry> ConfigListener for RegistryListener<R> {
    fn on_config_loaded(&self, config: &ServerConfig) {
        if !config.enable_gpt4 {
            tracing::debug!(prefix = GPT4_MODEL_PREFIX, "Disabling model family");
            self.registry
                .set_model_family_availability(GPT4_MODEL_PREFIX, false);
        }

        if let Some(text) = config.greeting() {
            self.registry.set_default_greeting(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = InMemoryRegistry::with_defaults();
        assert_eq!(registry.greeting(), DEFAULT_GREETING);
        assert!(registry.models().iter().all(|m| m.available));
        assert!(registry.is_available("gpt-4"));
        assert!(!registry.is_available("no-such-model"));
    }

    #[test]
    fn test_set_family_availability() {
        let registry = InMemoryRegistry::with_defaults();
        registry.set_model_family_availability("gpt-4", false);

        for model in registry.models() {
            assert_eq!(model.available, !model.name.starts_with("gpt-4"), "{}", model.name);
        }

        registry.set_model_family_availability("gpt-4", true);
        assert!(registry.is_available("gpt-4-32k"));
    }

    #[test]
    fn test_listener_disables_gpt4() {
        let registry = InMemoryRegistry::with_defaults();
        let listener = RegistryListener::new(registry.clone());

        listener.on_config_loaded(&ServerConfig {
            enable_gpt4: false,
            ..ServerConfig::default()
        });

        assert!(!registry.is_available("gpt-4"));
        assert!(!registry.is_available("gpt-4-32k-0613"));
        assert!(registry.is_available("gpt-3.5-turbo"));
        assert_eq!(registry.greeting(), DEFAULT_GREETING);
    }

    #[test]
    fn test_listener_keeps_gpt4_when_enabled() {
        let registry = InMemoryRegistry::with_defaults();
        let listener = RegistryListener::new(registry.clone());

        listener.on_config_loaded(&ServerConfig {
            enable_gpt4: true,
            bot_hello: Some("Hi!".into()),
            ..ServerConfig::default()
        });

        assert!(registry.models().iter().all(|m| m.available));
        assert_eq!(registry.greeting(), "Hi!");
    }

    #[test]
    fn test_listener_ignores_empty_greeting() {
        let registry = InMemoryRegistry::with_defaults();
        RegistryListener::new(registry.clone()).on_config_loaded(&ServerConfig {
            enable_gpt4: true,
            bot_hello: Some(String::new()),
            ..ServerConfig::default()
        });
        assert_eq!(registry.greeting(), DEFAULT_GREETING);
    }
}
