use crate::core::error::DatasetError;
use crate::core::video::FrameSequence;

/// 模型输入张量，通道优先：`[channels, time, height, width]`
#[derive(Debug, Clone, PartialEq)]
pub struct ClipTensor {
    pub shape: [usize; 4],
    pub data: Vec<f32>,
}

impl ClipTensor {
    pub fn from_frames(frames: &FrameSequence) -> Result<Self, DatasetError> {
        let first = frames
            .frames()
            .first()
            .ok_or_else(|| DatasetError::InvalidClip("no frames".to_string()))?;
        let (width, height) = frames.uniform_size().ok_or_else(|| {
            DatasetError::InvalidClip("frames differ in size".to_string())
        })?;

        let c = first.channels as usize;
        let t = frames.len();
        let h = height as usize;
        let w = width as usize;
        let plane = h * w;

        let mut data = vec![0.0f32; c * t * plane];
        for (ti, frame) in frames.iter().enumerate() {
            if frame.channels as usize != c || frame.data.len() != plane * c {
                return Err(DatasetError::InvalidClip(format!(
                    "frame {} has inconsistent channel data",
                    ti
                )));
            }
            for (pi, pixel) in frame.data.chunks_exact(c).enumerate() {
                for (ci, &value) in pixel.iter().enumerate() {
                    data[(ci * t + ti) * plane + pi] = value;
                }
            }
        }

        Ok(Self {
            shape: [c, t, h, w],
            data,
        })
    }

    pub fn channels(&self) -> usize {
        self.shape[0]
    }

    pub fn num_frames(&self) -> usize {
        self.shape[1]
    }

    pub fn height(&self) -> usize {
        self.shape[2]
    }

    pub fn width(&self) -> usize {
        self.shape[3]
    }

    pub fn at(&self, c: usize, t: usize, y: usize, x: usize) -> Option<f32> {
        let [cs, ts, hs, ws] = self.shape;
        if c >= cs || t >= ts || y >= hs || x >= ws {
            return None;
        }
        self.data.get(((c * ts + t) * hs + y) * ws + x).copied()
    }
}
