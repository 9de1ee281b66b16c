//! Header providers for the config request.

use chatgate_core::{AccessState, HeaderProvider};

/// Prefix marking an access code sent in the `Authorization` header.
pub const ACCESS_CODE_PREFIX: &str = "nk-";

/// A fixed set of headers.
#[derive(Debug, Clone, Default)]
pub struct StaticHeaders {
    headers: Vec<(String, String)>,
}

impl StaticHeaders {
    /// Creates an empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl HeaderProvider for StaticHeaders {
    fn headers(&self) -> Vec<(String, String)> {
        self.headers.clone()
    }
}

/// Builds auth headers from a credentials snapshot.
///
/// A personal token wins; otherwise the access code is sent with the
/// [`ACCESS_CODE_PREFIX`] marker. With neither, only the content headers
/// are produced.
#[derive(Debug, Clone, Default)]
pub struct CredentialHeaders {
    token: String,
    access_code: String,
}

impl CredentialHeaders {
    /// Creates a provider for the given credentials.
    pub fn new(token: impl Into<String>, access_code: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            access_code: access_code.into(),
        }
    }

    /// Snapshot the credentials held in `state`.
    pub fn from_state(state: &AccessState) -> Self {
        Self::new(state.token.clone(), state.access_code.clone())
    }
}

impl HeaderProvider for CredentialHeaders {
    fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![
            ("content-type".to_string(), "application/json".to_string()),
            ("x-requested-with".to_string(), "XMLHttpRequest".to_string()),
        ];

        if !self.token.is_empty() {
            headers.push(("authorization".to_string(), format!("Bearer {}", self.token)));
        } else if !self.access_code.is_empty() {
            headers.push((
                "authorization".to_string(),
                format!("Bearer {ACCESS_CODE_PREFIX}{}", self.access_code),
            ));
        }

        headers
    }
}
