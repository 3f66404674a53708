//! Model selection: which provider serves which model id.

pub mod provider_key;

pub use provider_key::ProviderKey;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A model id paired with the provider that serves it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LanguageModel {
    pub provider: ProviderKey,
    pub model_id: String,
}

impl LanguageModel {
    pub fn new(provider: ProviderKey, model_id: impl Into<String>) -> Self {
        Self {
            provider,
            model_id: model_id.into(),
        }
    }

    /// Parse `provider:model`, or a bare model id served by `default_provider`.
    ///
    /// Only a known provider prefix is split off, so ids that contain a colon
    /// themselves (`llama3:8b`) survive intact.
    pub fn resolve(raw: &str, default_provider: ProviderKey) -> Self {
        let raw = raw.trim();
        if let Some((prefix, model_id)) = raw.split_once(':') {
            if let Some(provider) = ProviderKey::parse(prefix) {
                if !model_id.is_empty() {
                    return Self::new(provider, model_id);
                }
            }
        }
        Self::new(default_provider, raw)
    }
}

impl fmt::Display for LanguageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.model_id)
    }
}
