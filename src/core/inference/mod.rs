pub mod checkpoint;
pub mod classifier;
pub mod clip;
pub mod evaluator;

pub use checkpoint::CheckpointInfo;
pub use classifier::{top_k, GlossClassifier};
pub use clip::ClipTensor;
pub use evaluator::{EvalReport, EvaluationConfig, Evaluator};
