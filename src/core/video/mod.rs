pub mod extractor;
#[cfg(feature = "ffmpeg")]
pub mod ffmpeg;
pub mod frame;
pub mod source;
pub mod transform;

use std::sync::Arc;

use crate::core::error::DatasetError;

pub use extractor::{ExtractorConfig, FrameExtractor};
#[cfg(feature = "ffmpeg")]
pub use ffmpeg::FfmpegBackend;
pub use frame::{Extraction, FrameSequence, NormalizedFrame};
pub use source::{FrameReader, MemoryBackend, MemoryVideo, VideoBackend};
pub use transform::ResizePolicy;

/// Backend used for real video files.
#[cfg(feature = "ffmpeg")]
pub fn default_backend() -> Result<Arc<dyn VideoBackend>, DatasetError> {
    Ok(Arc::new(FfmpegBackend::new()?))
}

#[cfg(not(feature = "ffmpeg"))]
pub fn default_backend() -> Result<Arc<dyn VideoBackend>, DatasetError> {
    Err(DatasetError::Config(
        "built without a video decoder, enable the `ffmpeg` feature".to_string(),
    ))
}
