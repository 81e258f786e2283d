pub mod dataset;
pub mod error;
pub mod inference;
pub mod labels;
pub mod video;

pub use dataset::{DatasetConfig, DatasetItem, WlaslDataset};
pub use error::DatasetError;
