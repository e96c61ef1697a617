//! Placeholder client used when no completion API key is available.
//!
//! Every call fails with [`ProviderError::NotConfigured`], which callers
//! recognise and answer with a fixed fallback reply instead of an error.

use async_trait::async_trait;
use aura_core::error::ProviderError;
use aura_core::provider::{Provider, ProviderRequest, ProviderResponse};

pub struct UnconfiguredProvider {
    name: String,
    reason: String,
}

impl UnconfiguredProvider {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Provider for UnconfiguredProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        _request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        Err(ProviderError::NotConfigured(self.reason.clone()))
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(false)
    }
}
