//! LLM response recovery for macrocoach.
//!
//! A [`builders`] function writes a prompt and hands it to a
//! [`pipeline::Pipeline`], which sends it through the [`gateway`], repairs
//! the raw text with [`sanitize`], checks its shape with [`validate`], and
//! turns it into a typed record with [`normalize`], retrying the whole
//! attempt a bounded number of times.

pub mod builders;
pub mod gateway;
pub mod normalize;
pub mod pipeline;
pub mod sanitize;
pub mod validate;

pub use gateway::{CompletionProvider, CompletionRequest, CompletionResult, GatewayError, ModelGateway};
pub use normalize::TypedRecord;
pub use pipeline::{AttemptError, Pipeline, PipelineError, RetryPolicy};
