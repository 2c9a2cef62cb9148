//! Error types for the `vidsheet` crate.
//!
//! This module defines [`SheetError`], the unified error type returned by all
//! fallible operations in the crate. Variants follow the stages of a run:
//! input problems, decoding, composition, and output.

use std::{io::Error as IoError, path::PathBuf, time::Duration};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `vidsheet` operations.
///
/// Every public method that can fail returns `Result<T, SheetError>`.
/// Only the top-level run decides whether an error ends the process; the
/// components themselves never swallow errors, with the single exception of
/// font loading (see [`SheetError::FontLoad`]).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SheetError {
    /// The video file could not be opened or parsed.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::FfmpegDecoder::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// A timestamp lies outside the video.
    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(Duration),

    /// A textual timestamp could not be parsed.
    #[error("Cannot parse timestamp {input:?}: {reason}")]
    TimestampParse {
        /// The text that was given.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A range's start value is greater than or equal to its end value.
    #[error("Invalid range: start ({start}) must be less than end ({end})")]
    InvalidRange {
        /// The start of the range.
        start: String,
        /// The end of the range.
        end: String,
    },

    /// Every extraction slot failed to decode; there is nothing to composite.
    #[error("No valid frames could be extracted from {attempted} timestamp(s)")]
    NoValidFrames {
        /// Number of planned extraction timestamps.
        attempted: usize,
    },

    /// The compositor was handed an empty frame list.
    #[error("Cannot compose a contact sheet without frames")]
    NoFrames,

    /// Grid geometry is unusable (zero columns, zero-sized thumbnails, ...).
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// An option value or configuration file is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A font could not be loaded. Text rendering degrades instead of failing.
    #[error("Failed to load font: {0}")]
    FontLoad(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while loading or encoding images.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for SheetError {
    fn from(error: FfmpegError) -> Self {
        SheetError::FfmpegError(error.to_string())
    }
}

impl SheetError {
    /// Returns `true` for errors caused by the caller's input (bad path,
    /// unparsable timestamps, invalid options) rather than by the media or
    /// the file system.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SheetError::FileOpen { .. }
                | SheetError::InvalidTimestamp(_)
                | SheetError::TimestampParse { .. }
                | SheetError::InvalidRange { .. }
                | SheetError::Config(_)
        )
    }
}
