//! Frame decoding.
//!
//! [`FrameDecoder`] is the capability the rest of the pipeline depends on:
//! report [`VideoMetadata`] and decode one frame at (or after) a timestamp.
//! [`FfmpegDecoder`] implements it on top of `ffmpeg-next`. Tests and
//! alternative engines plug in their own implementations.
//!
//! Every seek goes backwards to the nearest keyframe at or before the target
//! and flushes the codec, so no frame from a previous position leaks into
//! the next request. What happens after the keyframe depends on
//! [`SeekMode`].

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    util::error::EAGAIN,
};
use ffmpeg_sys_next::AV_NOPTS_VALUE;
use image::{DynamicImage, RgbImage};

use crate::{error::SheetError, metadata::VideoMetadata, utilities};

/// How far a seek decodes past the keyframe it lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeekMode {
    /// Return the first frame decoded after the keyframe seek. Fast, but the
    /// frame may be several seconds before the requested time.
    Fast,
    /// Decode forward, discarding frames, until one is presented at or after
    /// the requested time.
    #[default]
    Accurate,
}

impl SeekMode {
    /// `Fast` when `fast` is set, `Accurate` otherwise.
    pub fn from_fast_flag(fast: bool) -> Self {
        if fast { SeekMode::Fast } else { SeekMode::Accurate }
    }
}

/// A decoded picture paired with the timestamp it was requested at.
///
/// The image is always interleaved 8-bit RGB regardless of the source pixel
/// format. Dropping a `Frame` releases its pixel buffer.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Decoded pixels, normalised to RGB8.
    pub image: DynamicImage,
    /// The extraction timestamp this frame answers.
    pub timestamp: Duration,
    /// Presentation time of the frame actually decoded, when known. Differs
    /// from `timestamp` under [`SeekMode::Fast`].
    pub decoded_at: Option<Duration>,
}

impl Frame {
    /// Wrap an image as the answer for `timestamp`.
    pub fn new(image: DynamicImage, timestamp: Duration) -> Self {
        Self {
            image,
            timestamp,
            decoded_at: None,
        }
    }
}

/// The decoding capability used by the acquisition loop.
pub trait FrameDecoder {
    /// Metadata captured when the source was opened.
    fn metadata(&self) -> &VideoMetadata;

    /// Seek to `timestamp` and decode one frame according to `mode`.
    ///
    /// Returns `Ok(None)` when the stream ends before a suitable frame is
    /// found. Corrupt data is reported as an error.
    fn seek_and_decode(
        &mut self,
        timestamp: Duration,
        mode: SeekMode,
    ) -> Result<Option<Frame>, SheetError>;
}

/// An open video file backed by FFmpeg.
///
/// Holds the demuxer, the video decoder, and a lazily-built pixel-format
/// converter. All of them are released when the decoder is dropped or
/// [`close`](FfmpegDecoder::close)d.
pub struct FfmpegDecoder {
    input_context: Input,
    decoder: VideoDecoder,
    /// Converter plus the source definition it was built for.
    scaler: Option<(Pixel, u32, u32, ScalingContext)>,
    video_stream_index: usize,
    time_base: Rational,
    /// Presentation time of the stream's first frame; plan timestamps are
    /// relative to it.
    start_offset: Duration,
    metadata: VideoMetadata,
    file_path: PathBuf,
}

impl Debug for FfmpegDecoder {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FfmpegDecoder")
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl FfmpegDecoder {
    /// Open a video file and read its metadata.
    ///
    /// Initializes FFmpeg (idempotent), opens the container, selects the best
    /// video stream and prepares its decoder.
    ///
    /// # Errors
    ///
    /// - [`SheetError::FileOpen`] if the file cannot be read or parsed.
    /// - [`SheetError::NoVideoStream`] if the container has no video.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use vidsheet::{FfmpegDecoder, SheetError};
    ///
    /// let decoder = FfmpegDecoder::open("video.mp4")?;
    /// # Ok::<(), SheetError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SheetError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening video file: {}", file_path.display());

        let open_error = |reason: String| SheetError::FileOpen {
            path: file_path.clone(),
            reason,
        };

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let file_size = std::fs::metadata(path)
            .map_err(|error| open_error(error.to_string()))?
            .len();

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(SheetError::NoVideoStream)?;
        let video_stream_index = stream.index();
        let time_base = stream.time_base();
        let start_offset = if stream.start_time() != AV_NOPTS_VALUE {
            utilities::pts_to_duration(stream.start_time(), time_base)
        } else {
            Duration::ZERO
        };
        if !start_offset.is_zero() {
            log::debug!("Video stream starts at {start_offset:?}");
        }

        let decoder_context = CodecContext::from_parameters(stream.parameters()).map_err(
            |error| open_error(format!("Failed to read video codec parameters: {error}")),
        )?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| open_error(format!("Failed to create video decoder: {error}")))?;

        // Prefer the stream's own duration, fall back to the container's.
        let stream_duration = stream.duration();
        let container_duration = input_context.duration();
        let duration = if stream_duration != AV_NOPTS_VALUE && stream_duration > 0 {
            utilities::pts_to_duration(stream_duration, time_base)
        } else if container_duration > 0 {
            log::debug!("Stream has no duration, using container duration");
            Duration::from_micros(container_duration as u64)
        } else {
            log::warn!(
                "Neither stream nor container of {} reports a duration",
                file_path.display()
            );
            Duration::ZERO
        };

        let mut frame_rate = utilities::rational_to_f64(stream.avg_frame_rate());
        if frame_rate <= 0.0 {
            frame_rate = utilities::rational_to_f64(stream.rate());
        }

        let video_codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let audio_codec = input_context
            .streams()
            .best(Type::Audio)
            .and_then(|audio| CodecContext::from_parameters(audio.parameters()).ok())
            .map(|context| context.id().name().to_string())
            .filter(|name| !name.is_empty());

        let bit_rate = match input_context.bit_rate() {
            rate if rate > 0 => rate as u64,
            _ => decoder.bit_rate() as u64,
        };

        let metadata = VideoMetadata {
            filename: crate::metadata::file_name_of(path),
            file_size,
            duration,
            width: decoder.width(),
            height: decoder.height(),
            video_codec,
            audio_codec,
            frame_rate,
            bit_rate,
            format: input_context.format().name().to_string(),
        };

        log::info!(
            "Opened {} ({}, {:.2}s, {}x{} @ {:.2} fps, codec={})",
            file_path.display(),
            metadata.format,
            metadata.duration.as_secs_f64(),
            metadata.width,
            metadata.height,
            metadata.frame_rate,
            metadata.video_codec,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler: None,
            video_stream_index,
            time_base,
            start_offset,
            metadata,
            file_path,
        })
    }

    /// Release the demuxer and codec handles now instead of at scope end.
    pub fn close(self) {
        drop(self);
    }

    /// Convert a decoded frame of any pixel format to an RGB8 image.
    fn convert_frame(&mut self, decoded_frame: &VideoFrame) -> Result<DynamicImage, SheetError> {
        let (format, width, height) = (
            decoded_frame.format(),
            decoded_frame.width(),
            decoded_frame.height(),
        );

        let stale = !matches!(
            &self.scaler,
            Some((cached_format, cached_width, cached_height, _))
                if *cached_format == format && *cached_width == width && *cached_height == height
        );
        if stale {
            let context = ScalingContext::get(
                format,
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?;
            self.scaler = Some((format, width, height, context));
        }

        let mut rgb_frame = VideoFrame::empty();
        if let Some((_, _, _, scaler)) = self.scaler.as_mut() {
            scaler.run(decoded_frame, &mut rgb_frame)?;
        }

        let buffer = utilities::frame_to_buffer(&rgb_frame, width, height, 3);
        let rgb_image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            SheetError::VideoDecodeError(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;
        Ok(DynamicImage::ImageRgb8(rgb_image))
    }
}

impl FrameDecoder for FfmpegDecoder {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn seek_and_decode(
        &mut self,
        timestamp: Duration,
        mode: SeekMode,
    ) -> Result<Option<Frame>, SheetError> {
        let seek_target = utilities::duration_to_seek_timestamp(self.start_offset + timestamp);
        log::trace!("Seeking to {timestamp:?} ({mode:?})");

        // Keyframe at or before the target, never after it.
        self.input_context.seek(seek_target, ..seek_target)?;
        self.decoder.flush();

        let video_stream_index = self.video_stream_index;
        let clock = StreamClock {
            time_base: self.time_base,
            start_offset: self.start_offset,
        };
        let mut decoded_frame = VideoFrame::empty();
        let mut found = false;

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != video_stream_index {
                continue;
            }

            self.decoder.send_packet(&packet).map_err(|error| {
                SheetError::VideoDecodeError(format!("Corrupt packet near {timestamp:?}: {error}"))
            })?;

            while receive_frame(&mut self.decoder, &mut decoded_frame, timestamp)? {
                if clock.reached_target(&decoded_frame, timestamp, mode) {
                    found = true;
                    break;
                }
            }
            if found {
                break;
            }
        }

        if !found {
            // Drain frames the codec is still holding back.
            self.decoder.send_eof()?;
            while receive_frame(&mut self.decoder, &mut decoded_frame, timestamp)? {
                if clock.reached_target(&decoded_frame, timestamp, mode) {
                    found = true;
                    break;
                }
            }
        }

        if !found {
            log::debug!("End of stream reached before a frame at {timestamp:?}");
            return Ok(None);
        }

        let decoded_at = clock.presentation_time(&decoded_frame);
        let image = self.convert_frame(&decoded_frame)?;
        Ok(Some(Frame {
            image,
            timestamp,
            decoded_at,
        }))
    }
}

impl Drop for FfmpegDecoder {
    fn drop(&mut self) {
        log::debug!("Closing decoder for {}", self.file_path.display());
    }
}

/// Pull the next decoded frame.
///
/// Returns `false` when the codec needs more input or is fully drained, and
/// an error for anything else the codec reports.
fn receive_frame(
    decoder: &mut VideoDecoder,
    frame: &mut VideoFrame,
    timestamp: Duration,
) -> Result<bool, SheetError> {
    match decoder.receive_frame(frame) {
        Ok(()) => Ok(true),
        Err(FfmpegError::Other { errno: EAGAIN }) | Err(FfmpegError::Eof) => Ok(false),
        Err(error) => Err(SheetError::VideoDecodeError(format!(
            "Decoding near {timestamp:?} failed: {error}"
        ))),
    }
}

/// Maps stream PTS values onto the plan's timeline, which starts at zero.
#[derive(Debug, Clone, Copy)]
struct StreamClock {
    time_base: Rational,
    start_offset: Duration,
}

impl StreamClock {
    /// Best-effort presentation time of a decoded frame.
    fn presentation_time(&self, frame: &VideoFrame) -> Option<Duration> {
        let pts = frame.timestamp().or_else(|| frame.pts())?;
        Some(utilities::pts_to_duration(pts, self.time_base).saturating_sub(self.start_offset))
    }

    /// Whether `frame` satisfies a request for `target` under `mode`.
    ///
    /// Frames without any timestamp are accepted, since there is nothing to
    /// compare against.
    fn reached_target(&self, frame: &VideoFrame, target: Duration, mode: SeekMode) -> bool {
        match mode {
            SeekMode::Fast => true,
            SeekMode::Accurate => self
                .presentation_time(frame)
                .is_none_or(|presented| presented >= target),
        }
    }
}
