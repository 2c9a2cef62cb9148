//! Video metadata.
//!
//! [`VideoMetadata`] is read once when a decoder opens a file and is
//! immutable afterwards. The planner uses its duration; the compositor
//! prints it in the sheet header.

use std::{path::Path, time::Duration};

use serde::Serialize;

/// Metadata for the video being summarised.
///
/// # Example
///
/// ```no_run
/// use vidsheet::{FfmpegDecoder, FrameDecoder};
///
/// let decoder = FfmpegDecoder::open("input.mp4").unwrap();
/// let metadata = decoder.metadata();
/// println!("{} is {:?} long", metadata.filename, metadata.duration);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[must_use]
pub struct VideoMetadata {
    /// File name without directories (e.g. `"holiday.mp4"`).
    pub filename: String,
    /// Size of the file on disk in bytes.
    pub file_size: u64,
    /// Playback duration. `Duration::ZERO` when neither the stream nor the
    /// container reports one.
    pub duration: Duration,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Video codec name (e.g. `"h264"`).
    pub video_codec: String,
    /// Audio codec name, if an audio stream is present.
    pub audio_codec: Option<String>,
    /// Frames per second (approximate for variable-frame-rate content).
    pub frame_rate: f64,
    /// Overall bit rate in bits per second, 0 when unknown.
    pub bit_rate: u64,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
}

impl VideoMetadata {
    /// Build metadata for an in-memory or synthetic source.
    ///
    /// Codec and container fields are left empty; the file name is taken
    /// from the last component of `path`.
    pub fn synthetic<P: AsRef<Path>>(path: P, duration: Duration, width: u32, height: u32) -> Self {
        Self {
            filename: file_name_of(path.as_ref()),
            file_size: 0,
            duration,
            width,
            height,
            video_codec: String::new(),
            audio_codec: None,
            frame_rate: 0.0,
            bit_rate: 0,
            format: String::new(),
        }
    }

    /// Width divided by height, or `None` for degenerate dimensions.
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.width > 0 && self.height > 0).then(|| self.width as f64 / self.height as f64)
    }
}

/// Last path component as a lossy string.
pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
