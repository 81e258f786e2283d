pub mod harness;
pub mod models;

pub use harness::EvaluationHarness;
pub use models::config::HarnessConfig;
