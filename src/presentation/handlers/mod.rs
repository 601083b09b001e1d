mod error_response;
mod health;
mod orchestrations;
mod recordings;

pub use error_response::ErrorResponse;
pub use health::health_handler;
pub use orchestrations::{orchestration_status_handler, start_orchestration_handler};
pub use recordings::submit_recording_handler;
