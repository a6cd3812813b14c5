/// Core functionality modules
///
/// Contains the acquisition pipeline: answer normalization, the retrying
/// client, batch orchestration, and the validation helper.

pub mod client;
pub mod normalizer;
pub mod orchestrator;
pub mod retry;
pub mod validator;

pub use client::AcquisitionClient;
pub use normalizer::Normalizer;
pub use orchestrator::{BatchOrchestrator, ItemReport, Outcome, Summary};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use validator::{Validation, Validator, Verdict};
