//! 视频解码能力抽象
//!
//! The extractor only needs four things from a decoder: open a file, report
//! its frame count, seek to a frame and hand out the next RGB raster. Real
//! decoding lives in [`super::ffmpeg`]; [`MemoryBackend`] serves rasters that
//! are already in memory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use crate::core::error::DatasetError;

/// 已打开的视频，drop 时释放解码器
pub trait FrameReader {
    /// Total frame count as reported by the container, `None` when the
    /// container does not know it.
    fn frame_count(&self) -> Option<u64>;

    /// Position the reader so the next `read_frame` yields frame `frame`.
    fn seek(&mut self, frame: u64) -> Result<(), DatasetError>;

    /// Next frame, `Ok(None)` at end of stream.
    fn read_frame(&mut self) -> Result<Option<RgbImage>, DatasetError>;
}

pub trait VideoBackend: Send + Sync {
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn FrameReader + 'a>, DatasetError>;
}

/// 内存中的视频片段
#[derive(Debug, Clone, Default)]
pub struct MemoryVideo {
    frames: Vec<RgbImage>,
    reported_frames: Option<u64>,
    count_unknown: bool,
    fail_at: Option<usize>,
    seek_fails: bool,
}

impl MemoryVideo {
    pub fn new(frames: Vec<RgbImage>) -> Self {
        Self {
            frames,
            reported_frames: None,
            count_unknown: false,
            fail_at: None,
            seek_fails: false,
        }
    }

    /// `count` frames of `width`x`height`; frame `i` is filled with gray level
    /// `i * 10` so frames can be told apart after decoding.
    pub fn numbered(count: usize, width: u32, height: u32) -> Self {
        let frames = (0..count)
            .map(|i| {
                let level = (i * 10).min(255) as u8;
                RgbImage::from_pixel(width, height, Rgb([level, level, level]))
            })
            .collect();
        Self::new(frames)
    }

    /// Container claims `count` frames regardless of how many are stored.
    pub fn with_reported_frames(mut self, count: u64) -> Self {
        self.reported_frames = Some(count);
        self
    }

    /// 容器不记录帧数（常见于 Matroska/WebM）
    pub fn with_unknown_frame_count(mut self) -> Self {
        self.count_unknown = true;
        self
    }

    /// Every `seek` fails.
    pub fn failing_seek(mut self) -> Self {
        self.seek_fails = true;
        self
    }

    /// Reading frame `index` fails with a decode error.
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    videos: HashMap<PathBuf, MemoryVideo>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, video: MemoryVideo) {
        self.videos.insert(path.into(), video);
    }

    pub fn with_video(mut self, path: impl Into<PathBuf>, video: MemoryVideo) -> Self {
        self.insert(path, video);
        self
    }
}

impl VideoBackend for MemoryBackend {
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn FrameReader + 'a>, DatasetError> {
        let video = self
            .videos
            .get(path)
            .ok_or_else(|| DatasetError::media(path, "no such video"))?;
        Ok(Box::new(MemoryReader {
            path: path.to_path_buf(),
            video,
            position: 0,
        }))
    }
}

struct MemoryReader<'a> {
    path: PathBuf,
    video: &'a MemoryVideo,
    position: usize,
}

impl FrameReader for MemoryReader<'_> {
    fn frame_count(&self) -> Option<u64> {
        if self.video.count_unknown {
            return None;
        }
        Some(
            self.video
                .reported_frames
                .unwrap_or(self.video.frames.len() as u64),
        )
    }

    fn seek(&mut self, frame: u64) -> Result<(), DatasetError> {
        if self.video.seek_fails {
            return Err(DatasetError::media(&self.path, "seek not supported"));
        }
        self.position = usize::try_from(frame)
            .map_err(|_| DatasetError::media(&self.path, format!("cannot seek to {}", frame)))?;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Option<RgbImage>, DatasetError> {
        if self.video.fail_at == Some(self.position) {
            return Err(DatasetError::media(
                &self.path,
                format!("corrupt frame {}", self.position),
            ));
        }

        let frame = self.video.frames.get(self.position).cloned();
        if frame.is_some() {
            self.position += 1;
        }
        Ok(frame)
    }
}
