//! 帧尺寸策略：过小先等比放大，过大再逐轴缩放

use image::imageops::{self, FilterType};
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Two-step resize applied to every decoded frame.
///
/// 1. If the short side is below `min_side`, both axes are scaled by
///    `1 + (min_side - short) / short`.
/// 2. If either side then exceeds `max_side`, each axis is scaled by
///    `max_side / side` independently. This does not keep the aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizePolicy {
    pub min_side: u32,
    pub max_side: u32,
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self {
            min_side: 226,
            max_side: 256,
        }
    }
}

impl ResizePolicy {
    /// 放大后的尺寸
    pub fn upscaled_size(&self, width: u32, height: u32) -> (u32, u32) {
        let short = width.min(height);
        if short == 0 || short >= self.min_side {
            return (width, height);
        }

        let short = short as f64;
        let sc = 1.0 + (self.min_side as f64 - short) / short;
        (scale_axis(width, sc), scale_axis(height, sc))
    }

    /// 缩放后的尺寸（输入为放大后的尺寸）
    pub fn downscaled_size(&self, width: u32, height: u32) -> (u32, u32) {
        if width <= self.max_side && height <= self.max_side {
            return (width, height);
        }

        let max = self.max_side as f64;
        let w = width as f64;
        let h = height as f64;
        ((w * (max / w)).ceil() as u32, (h * (max / h)).ceil() as u32)
    }

    pub fn target_size(&self, width: u32, height: u32) -> (u32, u32) {
        let (w, h) = self.upscaled_size(width, height);
        self.downscaled_size(w, h)
    }

    pub fn apply(&self, image: RgbImage) -> RgbImage {
        let (w, h) = self.upscaled_size(image.width(), image.height());
        let image = resize_rgb(image, w, h);

        let (w, h) = self.downscaled_size(w, h);
        resize_rgb(image, w, h)
    }
}

fn scale_axis(side: u32, factor: f64) -> u32 {
    (side as f64 * factor).round_ties_even() as u32
}

fn resize_rgb(image: RgbImage, width: u32, height: u32) -> RgbImage {
    if image.width() == width && image.height() == height {
        return image;
    }
    imageops::resize(&image, width, height, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_frame_upscaled_then_squashed() {
        let policy = ResizePolicy::default();

        // sc = 1 + (226 - 100) / 100 = 2.26
        assert_eq!(policy.upscaled_size(100, 300), (226, 678));
        assert_eq!(policy.downscaled_size(226, 678), (256, 256));
        assert_eq!(policy.target_size(100, 300), (256, 256));
        assert_eq!(policy.target_size(300, 100), (256, 256));
    }

    #[test]
    fn test_upscale_only() {
        let policy = ResizePolicy::default();

        assert_eq!(policy.target_size(200, 200), (226, 226));
        assert_eq!(policy.target_size(224, 224), (226, 226));
        assert_eq!(policy.target_size(112, 112), (226, 226));
    }

    #[test]
    fn test_downscale_each_axis_independently() {
        let policy = ResizePolicy::default();

        assert_eq!(policy.target_size(640, 480), (256, 256));
        assert_eq!(policy.target_size(1280, 720), (256, 256));
        // 240 is within bounds but still mapped to 256 alongside the wide axis
        assert_eq!(policy.target_size(320, 240), (256, 256));
    }

    #[test]
    fn test_downscale_checks_upscaled_size() {
        let policy = ResizePolicy::default();

        // 150x250 -> 226x377 after the upscale, which exceeds 256
        assert_eq!(policy.upscaled_size(150, 250), (226, 377));
        assert_eq!(policy.target_size(150, 250), (256, 256));
    }

    #[test]
    fn test_in_bounds_frame_untouched() {
        let policy = ResizePolicy::default();

        assert_eq!(policy.target_size(256, 256), (256, 256));
        assert_eq!(policy.target_size(226, 240), (226, 240));
    }

    #[test]
    fn test_apply_produces_target_size() {
        let policy = ResizePolicy::default();
        let image = RgbImage::from_pixel(100, 300, image::Rgb([10, 20, 30]));

        let resized = policy.apply(image);

        assert_eq!(resized.dimensions(), (256, 256));
        assert_eq!(resized.get_pixel(128, 128), &image::Rgb([10, 20, 30]));
    }

    #[test]
    fn test_custom_policy() {
        let policy = ResizePolicy {
            min_side: 50,
            max_side: 64,
        };

        assert_eq!(policy.target_size(25, 30), (50, 60));
        assert_eq!(policy.target_size(40, 60), (64, 64));
    }
}
