pub mod advisory;
pub mod client;

pub use advisory::{request_advice, AdvisoryKind, AdvisoryRequest, AdvisoryService};
pub use client::LlmClient;
