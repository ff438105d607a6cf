// Public modules
pub mod chat_request;
pub mod chat_response;
pub mod health_check;
pub mod quota;
pub mod role;
pub mod transcript_entry;

// Re-exports
pub use chat_request::ChatRequest;
pub use chat_response::ChatResponse;
pub use health_check::HealthCheck;
pub use quota::{Quota, QuotaResponse, QuotaWindow};
pub use role::Role;
pub use transcript_entry::TranscriptEntry;
