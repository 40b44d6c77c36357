use macrocoach_model::{ProviderId, ResponseCategory};

use crate::gateway::GatewayError;

/// Why a single attempt failed. Every variant is retryable.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error("transport error: {0}")]
    Transport(#[source] GatewayError),

    #[error("{provider} returned no text")]
    EmptyResponse { provider: ProviderId },

    #[error("sanitized response is not valid JSON: {message}")]
    Parse { message: String },

    #[error("response does not have the {category} shape")]
    Shape { category: ResponseCategory },
}

impl AttemptError {
    /// Short failure class for log fields.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::EmptyResponse { .. } => "empty_response",
            Self::Parse { .. } => "parse",
            Self::Shape { .. } => "shape",
        }
    }
}

impl From<GatewayError> for AttemptError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::EmptyResponse { provider } => Self::EmptyResponse { provider },
            other => Self::Transport(other),
        }
    }
}

/// The only errors that leave the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("could not produce a {category} after {attempts} attempts: {last}")]
    ExhaustedRetries {
        category: ResponseCategory,
        attempts: u32,
        #[source]
        last: AttemptError,
    },

    #[error("expected a {expected} record but the pipeline produced {actual}")]
    UnexpectedRecord {
        expected: ResponseCategory,
        actual: ResponseCategory,
    },
}

impl PipelineError {
    pub fn category(&self) -> ResponseCategory {
        match self {
            Self::ExhaustedRetries { category, .. } => *category,
            Self::UnexpectedRecord { expected, .. } => *expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_errors_are_classified() {
        let empty: AttemptError = GatewayError::EmptyResponse {
            provider: ProviderId::Gemini,
        }
        .into();
        assert_eq!(empty.class(), "empty_response");

        let status: AttemptError = GatewayError::Status {
            provider: ProviderId::Together,
            status: 503,
            body: "busy".into(),
        }
        .into();
        assert_eq!(status.class(), "transport");
        assert!(status.to_string().contains("503"));
    }

    #[test]
    fn exhausted_error_names_category_and_attempts() {
        let err = PipelineError::ExhaustedRetries {
            category: ResponseCategory::GroceryList,
            attempts: 3,
            last: AttemptError::Shape {
                category: ResponseCategory::GroceryList,
            },
        };
        assert_eq!(
            err.to_string(),
            "could not produce a grocery_list after 3 attempts: response does not have the grocery_list shape"
        );
        assert_eq!(err.category(), ResponseCategory::GroceryList);
    }
}
