//! Persisted access-control state.
//!
//! [`AccessState`] is the record every store persists. It is wrapped in a
//! [`StoredState`] envelope that carries the schema version, so a later
//! release can detect documents written by an older one.
//!
//! Field names serialize in camelCase to stay compatible with documents
//! written by the web client.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Namespaced key the access state is persisted under.
pub const ACCESS_STORE_KEY: &str = "access-control";

/// Current schema version of the persisted access state.
pub const ACCESS_STORE_VERSION: u32 = 1;

/// Default base path of the proxied OpenAI API.
pub const DEFAULT_OPENAI_URL: &str = "/api/openai/";

/// Default base path of the proxied Midjourney API.
pub const DEFAULT_MIDJOURNEY_API: &str = "/api/midjourney/";

/// Credentials and server-declared access policy.
///
/// Empty strings mean "absent". Missing fields in a persisted document are
/// filled from [`AccessState::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessState {
    /// User-supplied bearer credential.
    pub token: String,

    /// User-supplied access code.
    pub access_code: String,

    /// Whether the server requires an access code.
    pub need_code: bool,

    /// Server hint: hide the user API key input.
    pub hide_user_api_key: bool,

    /// Base path of the proxied OpenAI API.
    pub openai_url: String,

    /// Base path of the proxied Midjourney API.
    #[serde(rename = "midJourneyAPI")]
    pub mid_journey_api: String,

    /// User-supplied Midjourney credential.
    pub mid_journey_key: String,

    /// User-supplied Midjourney endpoint.
    #[serde(rename = "midJourneyAPIURL")]
    pub mid_journey_api_url: String,

    /// Midjourney mode toggle.
    pub mj_mode: bool,
}

impl Default for AccessState {
    fn default() -> Self {
        Self {
            token: String::new(),
            access_code: String::new(),
            need_code: true,
            hide_user_api_key: false,
            openai_url: DEFAULT_OPENAI_URL.to_string(),
            mid_journey_api: DEFAULT_MIDJOURNEY_API.to_string(),
            mid_journey_key: String::new(),
            mid_journey_api_url: String::new(),
            mj_mode: true,
        }
    }
}

impl AccessState {
    /// Whether a personal token is configured.
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// Whether an access code is configured.
    pub fn has_access_code(&self) -> bool {
        !self.access_code.is_empty()
    }

    /// Clear the fields the user sets by hand.
    ///
    /// Server-declared policy (`need_code`, `hide_user_api_key`,
    /// `openai_url`, `mid_journey_api`) is left alone.
    pub fn clear_user_fields(&mut self) {
        let defaults = Self::default();
        self.token = defaults.token;
        self.access_code = defaults.access_code;
        self.mid_journey_key = defaults.mid_journey_key;
        self.mid_journey_api_url = defaults.mid_journey_api_url;
        self.mj_mode = defaults.mj_mode;
    }
}

/// Versioned envelope written to a persistent store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredState {
    /// The persisted state.
    pub state: AccessState,

    /// Schema version the state was written with.
    pub version: u32,
}

impl StoredState {
    /// Wrap a state with its schema version.
    pub fn new(state: AccessState, version: u32) -> Self {
        Self { state, version }
    }

    /// Parse an envelope from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::parse(format!("Failed to parse stored state: {e}")))
    }

    /// Serialize the envelope to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::serialization(format!("Failed to serialize state: {e}")))
    }

    /// Unwrap the state if it was written with `expected` version.
    ///
    /// There is no migration path: a document with any other version is
    /// discarded and the caller falls back to defaults.
    pub fn into_state(self, expected: u32) -> Option<AccessState> {
        if self.version == expected {
            Some(self.state)
        } else {
            log::warn!(
                "Discarding stored access state: version {} does not match {} and no migration exists",
                self.version,
                expected
            );
            None
        }
    }
}
