//! The `CompletionProvider` trait -- the capability every backend offers.

use async_trait::async_trait;
use macrocoach_model::ProviderId;

use super::types::{CompletionRequest, CompletionResult, GatewayError};

/// Accepts a prompt plus sampling config and returns generated text.
///
/// One call is one outbound request; implementations never retry. Sampling
/// parameters a backend does not support are ignored by that backend.
///
/// The trait is object-safe so providers can be stored as
/// `Box<dyn CompletionProvider>` in a [`super::ModelGateway`].
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    async fn complete(&self, request: &CompletionRequest)
    -> Result<CompletionResult, GatewayError>;
}

// Compile-time assertion: CompletionProvider must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn CompletionProvider) {}
};

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoProvider;

    #[async_trait]
    impl CompletionProvider for EchoProvider {
        fn id(&self) -> ProviderId {
            ProviderId::Together
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResult, GatewayError> {
            Ok(CompletionResult::new(request.prompt.clone()))
        }
    }

    #[tokio::test]
    async fn provider_is_usable_as_trait_object() {
        let provider: Box<dyn CompletionProvider> = Box::new(EchoProvider);
        let result = provider
            .complete(&CompletionRequest::new("m", "hello"))
            .await
            .unwrap();
        assert_eq!(result.text, "hello");
        assert_eq!(provider.id(), ProviderId::Together);
    }
}
