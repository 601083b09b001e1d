mod activity;
mod activity_executor;
mod input_summary;
mod orchestration_client;
mod orchestration_context;
mod orchestration_engine;
mod orchestration_error;
mod retry_policy;

pub use activity::{Activity, ActivityError, decode_input, encode_output};
pub use activity_executor::{ActivityExecutor, ActivityInvocation};
pub use input_summary::summarize_input;
pub use orchestration_client::{OrchestrationClient, TriggerOutcome};
pub use orchestration_context::{ActivityFailure, OrchestrationContext, RunStats};
pub use orchestration_engine::{Orchestration, OrchestrationEngine};
pub use orchestration_error::OrchestrationError;
pub use retry_policy::RetryPolicy;
