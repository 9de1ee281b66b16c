//! Server-declared configuration.
//!
//! The config endpoint answers with a free-form JSON object. [`ServerConfig`]
//! picks out the keys Chatgate understands; everything else is ignored.

use serde::{Deserialize, Serialize};

use crate::state::AccessState;
use crate::{Error, Result};

/// Model family that `enableGPT4` toggles.
pub const GPT4_MODEL_PREFIX: &str = "gpt-4";

/// Parsed body of the config endpoint.
///
/// Every access-state field is optional: only keys present (and non-null)
/// in the response overwrite local state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// See [`AccessState::token`].
    pub token: Option<String>,
    /// See [`AccessState::access_code`].
    pub access_code: Option<String>,
    /// See [`AccessState::need_code`].
    pub need_code: Option<bool>,
    /// See [`AccessState::hide_user_api_key`].
    pub hide_user_api_key: Option<bool>,
    /// See [`AccessState::openai_url`].
    pub openai_url: Option<String>,
    /// See [`AccessState::mid_journey_api`].
    #[serde(rename = "midJourneyAPI")]
    pub mid_journey_api: Option<String>,
    /// See [`AccessState::mid_journey_key`].
    pub mid_journey_key: Option<String>,
    /// See [`AccessState::mid_journey_api_url`].
    #[serde(rename = "midJourneyAPIURL")]
    pub mid_journey_api_url: Option<String>,
    /// See [`AccessState::mj_mode`].
    pub mj_mode: Option<bool>,

    /// Whether the GPT-4 model family is offered. Absent means disabled.
    #[serde(default, rename = "enableGPT4")]
    pub enable_gpt4: bool,

    /// Replacement text for the default greeting message.
    pub bot_hello: Option<String>,
}

impl ServerConfig {
    /// Parse a response body.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| Error::parse(format!("Invalid config response: {e}")))
    }

    /// Overwrite the fields of `state` that this response declares.
    pub fn merge_into(&self, state: &mut AccessState) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }

        set(&mut state.token, &self.token);
        set(&mut state.access_code, &self.access_code);
        set(&mut state.need_code, &self.need_code);
        set(&mut state.hide_user_api_key, &self.hide_user_api_key);
        set(&mut state.openai_url, &self.openai_url);
        set(&mut state.mid_journey_api, &self.mid_journey_api);
        set(&mut state.mid_journey_key, &self.mid_journey_key);
        set(&mut state.mid_journey_api_url, &self.mid_journey_api_url);
        set(&mut state.mj_mode, &self.mj_mode);
    }

    /// The greeting override, if the server sent a non-empty one.
    pub fn greeting(&self) -> Option<&str> {
        self.bot_hello.as_deref().filter(|s| !s.is_empty())
    }
}
