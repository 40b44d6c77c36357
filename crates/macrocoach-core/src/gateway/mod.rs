//! Model gateway: one interface over the completion providers.
//!
//! ```text
//! Pipeline
//!     |
//!     v
//! ModelGateway --complete(request, ProviderId)--> &dyn CompletionProvider
//!                                                     |
//!                                   TogetherProvider / GeminiProvider
//!                                                     |
//!                                            one HTTP POST, no retry
//! ```

pub mod gemini;
pub mod together;
pub mod trait_def;
pub mod types;

use std::collections::HashMap;

use macrocoach_model::{ProviderConfig, ProviderId};

pub use gemini::GeminiProvider;
pub use together::TogetherProvider;
pub use trait_def::CompletionProvider;
pub use types::{CompletionRequest, CompletionResult, GatewayError, SamplingParams};

/// The registered completion providers, keyed by [`ProviderId`].
#[derive(Default)]
pub struct ModelGateway {
    providers: HashMap<ProviderId, Box<dyn CompletionProvider>>,
}

impl ModelGateway {
    /// Create an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway holding the provider `config` selects.
    ///
    /// Credential problems surface here, once, rather than on every call.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, GatewayError> {
        let mut gateway = Self::new();
        match config.provider {
            ProviderId::Together => gateway.register(TogetherProvider::from_config(config)?),
            ProviderId::Gemini => gateway.register(GeminiProvider::from_config(config)?),
        };
        Ok(gateway)
    }

    /// Register a provider under its own id, returning any provider it
    /// replaces.
    pub fn register(
        &mut self,
        provider: impl CompletionProvider + 'static,
    ) -> Option<Box<dyn CompletionProvider>> {
        self.providers.insert(provider.id(), Box::new(provider))
    }

    pub fn get(&self, id: ProviderId) -> Option<&dyn CompletionProvider> {
        self.providers.get(&id).map(|b| b.as_ref())
    }

    /// Registered provider ids. Order is not guaranteed.
    pub fn list(&self) -> Vec<ProviderId> {
        self.providers.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Send `request` to the provider registered as `provider`.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
        provider: ProviderId,
    ) -> Result<CompletionResult, GatewayError> {
        let backend = self
            .get(provider)
            .ok_or(GatewayError::UnknownProvider(provider))?;
        backend.complete(request).await
    }
}

impl std::fmt::Debug for ModelGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelGateway")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}
