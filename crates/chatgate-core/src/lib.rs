//! Chatgate Core: shared types, traits, errors, and configuration.
//!
//! This crate provides the foundational types used across all Chatgate crates.
//! It has no internal Chatgate dependencies.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`state`]: Persisted access-control state and its storage envelope
//! - [`response`]: Server-declared configuration and the merge into state
//! - [`traits`]: Collaborator traits (store, transport, side effects)
//! - [`config`]: File/env configuration for host applications

pub mod config;
pub mod error;
pub mod response;
pub mod state;
pub mod traits;

// Re-export key types at crate root for convenience
pub use config::GateConfig;
pub use error::{Error, Result};
pub use response::ServerConfig;
pub use state::{ACCESS_STORE_KEY, ACCESS_STORE_VERSION, AccessState, StoredState};
pub use traits::{
    ConfigListener, ConfigTransport, HeaderProvider, PersistentStore, SideEffectRegistry,
};
