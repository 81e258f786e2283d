pub mod error;
pub mod index;
pub mod manifest;

pub use error::ManifestError;
pub use index::{IndexFilter, LabelIndex};
pub use manifest::{GlossEntry, InstanceRecord};
