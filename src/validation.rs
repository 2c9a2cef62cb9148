//! Video metadata validation.
//!
//! [`validate_metadata`] inspects the metadata of an opened video and
//! returns a [`ValidationReport`] describing anything that would make a
//! contact sheet look wrong or fail outright.
//!
//! # Example
//!
//! ```no_run
//! use vidsheet::{FfmpegDecoder, FrameDecoder, validation::validate_metadata};
//!
//! let decoder = FfmpegDecoder::open("input.mp4")?;
//! let report = validate_metadata(decoder.metadata());
//! if !report.is_valid() {
//!     print!("{report}");
//! }
//! # Ok::<(), vidsheet::SheetError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::{header::format_file_size, metadata::VideoMetadata, timestamp::format_timestamp};

/// Frame rates above this are reported as unusual.
const MAX_PLAUSIBLE_FRAME_RATE: f64 = 240.0;

/// Width/height ratios outside this range are reported as unusual.
const MIN_PLAUSIBLE_ASPECT_RATIO: f64 = 0.2;
const MAX_PLAUSIBLE_ASPECT_RATIO: f64 = 5.0;

/// Summary of metadata validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Informational notices (not problems).
    pub info: Vec<String>,
    /// Non-fatal issues that may degrade the sheet.
    pub warnings: Vec<String>,
    /// Issues that will make sheet generation fail.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Returns `true` if no errors were found. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of entries (info + warnings + errors).
    pub fn issue_count(&self) -> usize {
        self.info.len() + self.warnings.len() + self.errors.len()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for item in &self.info {
            writeln!(f, "[INFO] {item}")?;
        }
        for item in &self.warnings {
            writeln!(f, "[WARN] {item}")?;
        }
        for item in &self.errors {
            writeln!(f, "[ERROR] {item}")?;
        }
        if self.issue_count() == 0 {
            writeln!(f, "No issues found.")?;
        }
        Ok(())
    }
}

/// Run validation checks on `metadata`.
pub fn validate_metadata(metadata: &VideoMetadata) -> ValidationReport {
    let mut report = ValidationReport::default();

    if metadata.duration == Duration::ZERO {
        report
            .errors
            .push("Video duration is zero, no timestamps can be planned".to_string());
    } else if metadata.duration < Duration::from_secs(1) {
        report.warnings.push(format!(
            "Video is only {} ms long, thumbnails will repeat",
            metadata.duration.as_millis()
        ));
    }

    if metadata.width == 0 || metadata.height == 0 {
        report.errors.push(format!(
            "Invalid video dimensions: {}x{}",
            metadata.width, metadata.height,
        ));
    }

    let plausible = MIN_PLAUSIBLE_ASPECT_RATIO..=MAX_PLAUSIBLE_ASPECT_RATIO;
    if let Some(ratio) = metadata.aspect_ratio().filter(|ratio| !plausible.contains(ratio)) {
        report.warnings.push(format!(
            "Extreme aspect ratio ({ratio:.2}:1), derived thumbnail heights will be unusable",
        ));
    }

    if metadata.frame_rate <= 0.0 {
        report
            .warnings
            .push("Video frame rate is unknown".to_string());
    } else if metadata.frame_rate > MAX_PLAUSIBLE_FRAME_RATE {
        report.warnings.push(format!(
            "Unusually high frame rate ({:.1} fps), seeking may be slow",
            metadata.frame_rate,
        ));
    }

    if metadata.bit_rate == 0 {
        report
            .info
            .push("Bit rate is not reported by the container".to_string());
    }

    match &metadata.audio_codec {
        Some(codec) => report.info.push(format!("Audio: {codec}")),
        None => report.info.push("No audio stream found".to_string()),
    }

    report.info.push(format!(
        "Video: {} {}x{} @ {:.2} fps, {} ({})",
        metadata.video_codec,
        metadata.width,
        metadata.height,
        metadata.frame_rate,
        format_timestamp(metadata.duration),
        format_file_size(metadata.file_size),
    ));

    report
}
