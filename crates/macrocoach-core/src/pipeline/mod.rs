//! Retry orchestrator: gateway, sanitizer, validator, and normalizer run as
//! one unit with bounded retry.
//!
//! Each attempt moves through `Requesting -> Parsing -> Validating -> Done`.
//! A gateway failure, a parse failure, or a shape rejection ends the attempt;
//! after [`RetryPolicy::max_attempts`] failed attempts the run ends with
//! [`PipelineError::ExhaustedRetries`]. The pipeline holds no state between
//! runs, so one `Pipeline` can serve concurrent runs.

pub mod error;
pub mod prompt;
pub mod retry;

use std::sync::Arc;

use macrocoach_model::{ProviderConfig, ProviderId, ResponseCategory};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::gateway::{CompletionRequest, GatewayError, ModelGateway};
use crate::normalize::{TypedRecord, normalize};
use crate::sanitize::sanitize;
use crate::validate::validate;

pub use error::{AttemptError, PipelineError};
pub use prompt::json_only_prompt;
pub use retry::RetryPolicy;

#[derive(Debug, Clone)]
pub struct Pipeline {
    gateway: Arc<ModelGateway>,
    provider: ProviderId,
    model: String,
    policy: RetryPolicy,
}

impl Pipeline {
    pub fn new(gateway: Arc<ModelGateway>, provider: ProviderId, model: impl Into<String>) -> Self {
        Self {
            gateway,
            provider,
            model: model.into(),
            policy: RetryPolicy::default(),
        }
    }

    /// Build the configured provider and a pipeline targeting it.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, GatewayError> {
        let gateway = ModelGateway::from_config(config)?;
        Ok(Self::new(Arc::new(gateway), config.provider, config.model.clone()))
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run `prompt` until a response of `category` validates or the retry
    /// budget is spent.
    pub async fn execute(
        &self,
        prompt: &str,
        category: ResponseCategory,
    ) -> Result<TypedRecord, PipelineError> {
        let run_id = Uuid::new_v4();
        let request = CompletionRequest::new(self.model.clone(), json_only_prompt(prompt));
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.attempt(&request, category, run_id, attempt).await {
                Ok(record) => {
                    info!(%run_id, %category, attempt, "pipeline run succeeded");
                    return Ok(record);
                }
                Err(err) => {
                    warn!(
                        %run_id,
                        %category,
                        attempt,
                        max_attempts,
                        class = err.class(),
                        error = %err,
                        "pipeline attempt failed"
                    );
                    if attempt >= max_attempts {
                        return Err(PipelineError::ExhaustedRetries {
                            category,
                            attempts: attempt,
                            last: err,
                        });
                    }
                    if !self.policy.delay.is_zero() {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
            }
        }
    }

    /// Like [`execute`](Self::execute) for callers that already know the
    /// record type they need.
    pub async fn execute_as<T>(
        &self,
        prompt: &str,
        category: ResponseCategory,
        extract: impl FnOnce(TypedRecord) -> Option<T>,
    ) -> Result<T, PipelineError> {
        let record = self.execute(prompt, category).await?;
        let actual = record.category();
        extract(record).ok_or(PipelineError::UnexpectedRecord {
            expected: category,
            actual,
        })
    }

    async fn attempt(
        &self,
        request: &CompletionRequest,
        category: ResponseCategory,
        run_id: Uuid,
        attempt: u32,
    ) -> Result<TypedRecord, AttemptError> {
        let result = self.gateway.complete(request, self.provider).await?;
        let cleaned = sanitize(&result.text);
        debug!(%run_id, attempt, raw = %result.text, cleaned = %cleaned, "sanitized response");
        parse_and_check(&cleaned, category)
    }
}

/// Parse, validate, and normalize already-sanitized text.
///
/// This is the part of an attempt after the gateway call, exposed for
/// offline repair of saved responses.
pub fn parse_and_check(cleaned: &str, category: ResponseCategory) -> Result<TypedRecord, AttemptError> {
    let mut value: Value = serde_json::from_str(cleaned).map_err(|e| AttemptError::Parse {
        message: e.to_string(),
    })?;
    if !validate(&mut value, category) {
        return Err(AttemptError::Shape { category });
    }
    Ok(normalize(&value, category))
}
