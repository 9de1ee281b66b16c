//! HTTP transport for Chatgate server config.
//!
//! [`HttpConfigTransport`] implements
//! [`ConfigTransport`](chatgate_core::ConfigTransport) with a single `POST`
//! to the config endpoint. Request headers come from a
//! [`HeaderProvider`](chatgate_core::HeaderProvider); [`CredentialHeaders`]
//! and [`StaticHeaders`] cover the common cases.

mod headers;
mod transport;

pub use headers::{ACCESS_CODE_PREFIX, CredentialHeaders, StaticHeaders};
pub use transport::HttpConfigTransport;
