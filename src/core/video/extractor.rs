use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};

use super::frame::{Extraction, FrameSequence, NormalizedFrame};
use super::source::VideoBackend;
use super::transform::ResizePolicy;
use crate::core::error::DatasetError;

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub video_folder: PathBuf,
    pub extension: String,
    pub resize: ResizePolicy,
}

impl ExtractorConfig {
    pub fn new(video_folder: impl Into<PathBuf>) -> Self {
        Self {
            video_folder: video_folder.into(),
            extension: "mp4".to_string(),
            resize: ResizePolicy::default(),
        }
    }
}

/// 视频帧提取器：从起始帧解码并归一化
///
/// Holds no per-call state: each [`extract`](Self::extract) opens its own
/// reader and drops it before returning.
#[derive(Clone)]
pub struct FrameExtractor {
    config: ExtractorConfig,
    backend: Arc<dyn VideoBackend>,
}

impl FrameExtractor {
    pub fn new(config: ExtractorConfig, backend: Arc<dyn VideoBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// `<video_folder>/<video_id>.<extension>`
    pub fn video_path(&self, video_id: &str) -> PathBuf {
        self.config
            .video_folder
            .join(format!("{}.{}", video_id, self.config.extension))
    }

    pub fn extract(
        &self,
        video_id: &str,
        start: u64,
        max_frames: Option<usize>,
    ) -> Result<Extraction, DatasetError> {
        let path = self.video_path(video_id);
        self.extract_path(&path, start, max_frames)
    }

    pub fn extract_path(
        &self,
        path: &Path,
        start: u64,
        max_frames: Option<usize>,
    ) -> Result<Extraction, DatasetError> {
        let mut reader = self.backend.open(path)?;

        // 帧数未知时一直解码到流结束（仍受 max_frames 限制）
        let total = reader.frame_count();
        let available = total.map_or(usize::MAX, |total| {
            usize::try_from(total.saturating_sub(start)).unwrap_or(usize::MAX)
        });
        let budget = max_frames.map_or(available, |cap| cap.min(available));
        debug!(
            "🎬 {:?}: {} frames total, start {}, decoding {}",
            path,
            total.map_or_else(|| "unknown".to_string(), |t| t.to_string()),
            start,
            budget
        );

        let mut frames = FrameSequence::with_capacity(budget.min(1024));
        if budget == 0 {
            return Ok(Extraction::Complete(frames));
        }

        if let Err(e) = reader.seek(start) {
            return Ok(partial(path, frames, format!("seek to frame {} failed: {}", start, e)));
        }

        while frames.len() < budget {
            let image = match reader.read_frame() {
                Ok(Some(image)) => image,
                Ok(None) if total.is_none() => break,
                Ok(None) => {
                    let reason = format!(
                        "end of stream after {} of {} frames",
                        frames.len(),
                        budget
                    );
                    return Ok(partial(path, frames, reason));
                }
                Err(e) => {
                    let reason = format!("frame {} unreadable: {}", start + frames.len() as u64, e);
                    return Ok(partial(path, frames, reason));
                }
            };

            let resized = self.config.resize.apply(image);
            frames.push(NormalizedFrame::from_rgb(&resized));
        }

        Ok(Extraction::Complete(frames))
    }
}

fn partial(path: &Path, frames: FrameSequence, reason: String) -> Extraction {
    warn!(
        "⚠️ Partial decode of {:?} ({} frames kept): {}",
        path,
        frames.len(),
        reason
    );
    Extraction::PartialDecode { frames, reason }
}
