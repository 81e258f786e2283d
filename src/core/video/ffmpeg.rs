//! FFmpeg 解码后端（`ffmpeg` feature）

use std::path::{Path, PathBuf};

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{context::Input, Pixel},
    frame::Video as VideoFrame,
    media::Type as MediaType,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;
use log::{debug, info};
use once_cell::sync::OnceCell;

use super::source::{FrameReader, VideoBackend};
use crate::core::error::DatasetError;

static FFMPEG_INIT: OnceCell<()> = OnceCell::new();

fn ensure_initialized() -> Result<(), DatasetError> {
    FFMPEG_INIT
        .get_or_try_init(|| {
            ffmpeg_next::init().map_err(|e| DatasetError::Config(format!("ffmpeg init: {}", e)))?;
            info!("🎞️ FFmpeg initialized");
            Ok(())
        })
        .map(|_| ())
}

/// 基于 libavformat/libavcodec 的解码后端
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegBackend;

impl FfmpegBackend {
    pub fn new() -> Result<Self, DatasetError> {
        ensure_initialized()?;
        Ok(Self)
    }
}

impl VideoBackend for FfmpegBackend {
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn FrameReader + 'a>, DatasetError> {
        ensure_initialized()?;
        Ok(Box::new(FfmpegReader::open(path)?))
    }
}

struct FfmpegReader {
    path: PathBuf,
    input: Input,
    stream_index: usize,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    frame_count: Option<u64>,
    decoded: VideoFrame,
    rgb: VideoFrame,
    /// Decoded frames still to be discarded after a seek.
    skip: u64,
    eof_sent: bool,
}

impl FfmpegReader {
    fn open(path: &Path) -> Result<Self, DatasetError> {
        let media_err = |e: ffmpeg_next::Error| DatasetError::media(path, e.to_string());

        let input = ffmpeg_next::format::input(&path).map_err(media_err)?;
        let stream = input
            .streams()
            .best(MediaType::Video)
            .ok_or_else(|| DatasetError::media(path, "no video stream"))?;
        let stream_index = stream.index();
        let frame_count = stream_frame_count(&stream, input.duration());

        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|ctx| ctx.decoder().video())
            .map_err(media_err)?;
        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ScalingFlags::BILINEAR,
        )
        .map_err(media_err)?;

        debug!(
            "Opened {:?}: {}x{}, {:?} frames",
            path,
            decoder.width(),
            decoder.height(),
            frame_count
        );

        Ok(Self {
            path: path.to_path_buf(),
            input,
            stream_index,
            decoder,
            scaler,
            frame_count,
            decoded: VideoFrame::empty(),
            rgb: VideoFrame::empty(),
            skip: 0,
            eof_sent: false,
        })
    }

    fn decode_error(&self, e: ffmpeg_next::Error) -> DatasetError {
        DatasetError::media(&self.path, e.to_string())
    }

    fn to_image(&self) -> Result<RgbImage, DatasetError> {
        let width = self.rgb.width();
        let height = self.rgb.height();
        let stride = self.rgb.stride(0);
        let data = self.rgb.data(0);
        let row = width as usize * 3;

        let mut buffer = Vec::with_capacity(row * height as usize);
        for y in 0..height as usize {
            let start = y * stride;
            let line = data
                .get(start..start + row)
                .ok_or_else(|| DatasetError::media(&self.path, "short RGB plane"))?;
            buffer.extend_from_slice(line);
        }

        RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| DatasetError::media(&self.path, "cannot build RGB image"))
    }
}

impl FrameReader for FfmpegReader {
    fn frame_count(&self) -> Option<u64> {
        self.frame_count
    }

    // Frame-accurate: decode from the beginning and drop everything before
    // `frame`. Only valid before the first read.
    fn seek(&mut self, frame: u64) -> Result<(), DatasetError> {
        self.skip = frame;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Option<RgbImage>, DatasetError> {
        loop {
            if self.decoder.receive_frame(&mut self.decoded).is_ok() {
                if self.skip > 0 {
                    self.skip -= 1;
                    continue;
                }
                self.scaler
                    .run(&self.decoded, &mut self.rgb)
                    .map_err(|e| self.decode_error(e))?;
                return self.to_image().map(Some);
            }

            if self.eof_sent {
                return Ok(None);
            }

            let next = self
                .input
                .packets()
                .next()
                .map(|(stream, packet)| (stream.index(), packet));
            match next {
                Some((index, packet)) if index == self.stream_index => {
                    if let Err(e) = self.decoder.send_packet(&packet) {
                        return Err(self.decode_error(e));
                    }
                }
                Some(_) => {}
                None => {
                    if let Err(e) = self.decoder.send_eof() {
                        return Err(self.decode_error(e));
                    }
                    self.eof_sent = true;
                }
            }
        }
    }
}

/// 帧数：优先 `nb_frames`，其次流时长 x 帧率，再次容器时长 x 帧率
///
/// `container_duration` is in `AV_TIME_BASE` units. `None` when none of the
/// three is known.
fn stream_frame_count(
    stream: &ffmpeg_next::format::stream::Stream,
    container_duration: i64,
) -> Option<u64> {
    let frames = stream.frames();
    if frames > 0 {
        return Some(frames as u64);
    }

    let rate = f64::from(stream.avg_frame_rate());
    if !rate.is_finite() || rate <= 0.0 {
        return None;
    }

    let seconds = if stream.duration() > 0 {
        stream.duration() as f64 * f64::from(stream.time_base())
    } else if container_duration > 0 {
        container_duration as f64 / f64::from(ffmpeg_next::ffi::AV_TIME_BASE)
    } else {
        return None;
    };
    Some((seconds * rate).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ffmpeg_next::{codec, encoder, format, Packet, Rational};

    use crate::core::video::{Extraction, ExtractorConfig, FrameExtractor};

    const FRAMES: i64 = 10;
    const SIZE: u32 = 64;

    /// Writes a clip of flat gray frames; frame `i` has luma `16 + 20 * i`.
    fn encode_clip(path: &Path) -> Result<(), ffmpeg_next::Error> {
        ensure_initialized().map_err(|_| ffmpeg_next::Error::Bug)?;
        let time_base = Rational(1, 25);

        let mut octx = format::output(&path)?;
        let codec = encoder::find(codec::Id::MPEG4).ok_or(ffmpeg_next::Error::EncoderNotFound)?;
        let global_header = octx.format().flags().contains(format::Flags::GLOBAL_HEADER);

        let mut video = codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;
        video.set_width(SIZE);
        video.set_height(SIZE);
        video.set_format(Pixel::YUV420P);
        video.set_time_base(time_base);
        video.set_frame_rate(Some(Rational(25, 1)));
        if global_header {
            video.set_flags(codec::Flags::GLOBAL_HEADER);
        }
        let mut video = video.open()?;

        let stream_index = {
            let mut ost = octx.add_stream(codec)?;
            ost.set_parameters(&video);
            ost.set_time_base(time_base);
            ost.index()
        };
        octx.write_header()?;
        let stream_time_base = octx
            .stream(stream_index)
            .map(|s| s.time_base())
            .ok_or(ffmpeg_next::Error::StreamNotFound)?;

        let drain = |video: &mut encoder::video::Encoder,
                     octx: &mut format::context::Output|
         -> Result<(), ffmpeg_next::Error> {
            let mut packet = Packet::empty();
            while video.receive_packet(&mut packet).is_ok() {
                packet.set_stream(stream_index);
                packet.rescale_ts(time_base, stream_time_base);
                packet.write_interleaved(octx)?;
            }
            Ok(())
        };

        for i in 0..FRAMES {
            let mut frame = VideoFrame::new(Pixel::YUV420P, SIZE, SIZE);
            frame.data_mut(0).fill(16 + 20 * i as u8);
            frame.data_mut(1).fill(128);
            frame.data_mut(2).fill(128);
            frame.set_pts(Some(i));
            video.send_frame(&frame)?;
            drain(&mut video, &mut octx)?;
        }
        video.send_eof()?;
        drain(&mut video, &mut octx)?;
        octx.write_trailer()
    }

    fn extractor_for(dir: &Path, extension: &str) -> FrameExtractor {
        let mut config = ExtractorConfig::new(dir);
        config.extension = extension.to_string();
        FrameExtractor::new(config, Arc::new(FfmpegBackend::new().unwrap()))
    }

    #[test]
    fn test_decode_from_offset() {
        let dir = tempfile::tempdir().unwrap();
        encode_clip(&dir.path().join("clip.mp4")).unwrap();
        let extractor = extractor_for(dir.path(), "mp4");

        let extraction = extractor.extract("clip", 3, None).unwrap();

        assert!(extraction.is_complete());
        let frames = extraction.frames();
        assert_eq!(frames.len(), 7);
        assert_eq!(frames.uniform_size(), Some((226, 226)));
        for frame in frames {
            assert!(frame.data.iter().all(|v| (-1.0..=1.0).contains(v)));
        }

        // brightness grows frame by frame, and the first one is frame 3
        let levels: Vec<f32> = frames.iter().map(|f| f.data[0]).collect();
        assert!(levels.windows(2).all(|w| w[0] < w[1]), "{:?}", levels);
        let luma3 = 16.0 + 20.0 * 3.0;
        let expected = ((luma3 - 16.0) * 255.0 / 219.0 / 255.0) * 2.0 - 1.0;
        assert!((levels[0] - expected).abs() < 0.1, "{} vs {}", levels[0], expected);
    }

    #[test]
    fn test_start_at_end_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        encode_clip(&dir.path().join("clip.mp4")).unwrap();
        let extractor = extractor_for(dir.path(), "mp4");

        let extraction = extractor.extract("clip", FRAMES as u64, None).unwrap();

        assert!(matches!(&extraction, Extraction::Complete(frames) if frames.is_empty()));
    }

    #[test]
    fn test_matroska_without_frame_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mkv");
        encode_clip(&path).unwrap();

        let backend = FfmpegBackend::new().unwrap();
        let count = backend.open(&path).unwrap().frame_count();
        assert!(count.map_or(true, |n| n >= 7), "{:?}", count);

        let extraction = extractor_for(dir.path(), "mkv")
            .extract("clip", 3, Some(4))
            .unwrap();
        assert!(extraction.is_complete());
        assert_eq!(extraction.frames().len(), 4);
    }

    #[test]
    fn test_missing_file_is_media_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = extractor_for(dir.path(), "mp4").extract("nope", 0, None);
        assert!(matches!(result, Err(DatasetError::Media { .. })));
    }
}
