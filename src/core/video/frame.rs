use image::RgbImage;

/// 归一化后的帧，像素值位于 [-1, 1]
///
/// Row-major HWC layout: `data[(y * width + x) * channels + c]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedFrame {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub data: Vec<f32>,
}

impl NormalizedFrame {
    /// Maps every 8-bit channel value `v` to `(v / 255) * 2 - 1`.
    pub fn from_rgb(image: &RgbImage) -> Self {
        let data = image
            .as_raw()
            .iter()
            .map(|&v| (v as f32 / 255.0) * 2.0 - 1.0)
            .collect();

        Self {
            width: image.width(),
            height: image.height(),
            channels: 3,
            data,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<&[f32]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let c = self.channels as usize;
        let start = (y as usize * self.width as usize + x as usize) * c;
        self.data.get(start..start + c)
    }
}

/// Frames of one clip in temporal order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSequence {
    frames: Vec<NormalizedFrame>,
}

impl FrameSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, frame: NormalizedFrame) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[NormalizedFrame] {
        &self.frames
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedFrame> {
        self.frames.iter()
    }

    pub fn into_frames(self) -> Vec<NormalizedFrame> {
        self.frames
    }

    /// `(width, height)` shared by every frame, `None` if empty or ragged.
    pub fn uniform_size(&self) -> Option<(u32, u32)> {
        let first = self.frames.first()?;
        let size = (first.width, first.height);
        self.frames
            .iter()
            .all(|f| (f.width, f.height) == size)
            .then_some(size)
    }
}

impl From<Vec<NormalizedFrame>> for FrameSequence {
    fn from(frames: Vec<NormalizedFrame>) -> Self {
        Self { frames }
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a NormalizedFrame;
    type IntoIter = std::slice::Iter<'a, NormalizedFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Outcome of decoding one clip.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Every requested frame was decoded.
    Complete(FrameSequence),
    /// Decoding stopped early; `frames` holds what was read before `reason`.
    PartialDecode {
        frames: FrameSequence,
        reason: String,
    },
}

impl Extraction {
    pub fn frames(&self) -> &FrameSequence {
        match self {
            Extraction::Complete(frames) => frames,
            Extraction::PartialDecode { frames, .. } => frames,
        }
    }

    pub fn into_frames(self) -> FrameSequence {
        match self {
            Extraction::Complete(frames) => frames,
            Extraction::PartialDecode { frames, .. } => frames,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Extraction::Complete(_))
    }

    pub fn partial_reason(&self) -> Option<&str> {
        match self {
            Extraction::Complete(_) => None,
            Extraction::PartialDecode { reason, .. } => Some(reason),
        }
    }
}
