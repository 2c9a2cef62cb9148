//! Sheet options.
//!
//! [`SheetOptions`] is the fully resolved option set of one run. It is
//! deserialised from TOML with every field optional, so a configuration file
//! only lists what it changes:
//!
//! ```toml
//! numcaps = 16
//! columns = 4
//! skip_blank = true
//! background = "32,32,32"
//! filters = "sepia,strip"
//! ```
//!
//! Values are layered as defaults, then the file, then command-line flags;
//! the binary applies the last layer. [`SheetOptions::validate`] checks the
//! combined result once, after which the per-stage option structs are
//! derived with [`plan_options`](SheetOptions::plan_options),
//! [`acquisition_options`](SheetOptions::acquisition_options) and
//! [`composite_options`](SheetOptions::composite_options).

use std::path::{Path, PathBuf};

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::{
    acquisition::{AcquisitionOptions, DEFAULT_MAX_RETRIES, RETRY_STEP},
    compositor::CompositeOptions,
    decoder::SeekMode,
    error::SheetError,
    filter::{Filter, parse_filters},
    quality::{DEFAULT_BLANK_THRESHOLD, DEFAULT_BLUR_THRESHOLD, QualityGate},
    timestamp::{PlanOptions, parse_timestamp},
};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "vidsheet.toml";

/// Default output pattern: the composite next to the input, as JPEG.
pub const DEFAULT_OUTPUT_PATTERN: &str = "{{.Path}}{{.Name}}.jpg";

/// Resolved options for one contact sheet run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetOptions {
    /// Number of thumbnails in count mode.
    pub numcaps: u32,
    /// Seconds between thumbnails; a positive value replaces count mode.
    pub interval: u32,
    /// Start of the sampled range, `HH:MM:SS`.
    pub from: String,
    /// End of the sampled range; `None` means the end of the video.
    pub to: Option<String>,
    /// Leave out the closing credits.
    pub skip_credits: bool,
    /// Keyframe seeking instead of decoding up to the exact time.
    pub fast: bool,

    /// Thumbnails per row.
    pub columns: u32,
    /// Thumbnail width in pixels.
    pub width: u32,
    /// Thumbnail height in pixels; 0 keeps the aspect ratio.
    pub height: u32,
    /// Gap around and between thumbnails.
    pub padding: u32,
    /// Border drawn around each thumbnail.
    pub border: u32,
    /// Font size for labels and header.
    pub font_size: f32,
    /// Font file; unset searches the system.
    pub font: Option<PathBuf>,

    /// Draw the header band.
    pub header: bool,
    /// Add codec, frame rate and bit rate to the header.
    pub header_meta: bool,
    /// Extra header line.
    pub comment: Option<String>,
    /// Label thumbnails with their timestamp.
    pub timestamps: bool,

    /// Retry frames that are (almost) a single colour.
    pub skip_blank: bool,
    /// Blank detection threshold, 0 to 100.
    pub blank_threshold: u8,
    /// Retry blurry frames.
    pub skip_blurry: bool,
    /// Blur detection threshold, 0 to 100.
    pub blur_threshold: u8,
    /// Retry frames dominated by skin tones.
    pub sfw: bool,
    /// Decode attempts per thumbnail.
    pub max_retries: u32,

    /// Canvas colour, `R,G,B[,A]`.
    pub background: String,
    /// Header band colour.
    pub header_background: String,
    /// Header text colour.
    pub header_font_color: String,
    /// Timestamp label colour.
    pub timestamp_font_color: String,
    /// Thumbnail border colour.
    pub border_color: String,

    /// Comma-separated filter names.
    pub filters: Option<String>,
    /// Image centred on the sheet.
    pub watermark: Option<PathBuf>,
    /// Image placed on every thumbnail.
    pub watermark_all: Option<PathBuf>,
    /// Seed for randomised filters.
    pub seed: Option<u64>,

    /// Output path pattern with `{{.Path}}` and `{{.Name}}` placeholders.
    pub output: String,
    /// Also write every thumbnail frame as its own image.
    pub single_images: bool,
    /// Also write a WebVTT cue sheet.
    pub webvtt: bool,
    /// Replace existing outputs.
    pub overwrite: bool,
    /// Skip inputs whose output already exists.
    pub skip_existing: bool,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            numcaps: 4,
            interval: 0,
            from: "00:00:00".to_string(),
            to: None,
            skip_credits: false,
            fast: false,
            columns: 2,
            width: 400,
            height: 0,
            padding: 10,
            border: 0,
            font_size: 12.0,
            font: None,
            header: true,
            header_meta: false,
            comment: None,
            timestamps: true,
            skip_blank: false,
            blank_threshold: DEFAULT_BLANK_THRESHOLD,
            skip_blurry: false,
            blur_threshold: DEFAULT_BLUR_THRESHOLD,
            sfw: false,
            max_retries: DEFAULT_MAX_RETRIES,
            background: "0,0,0".to_string(),
            header_background: "0,0,0".to_string(),
            header_font_color: "255,255,255".to_string(),
            timestamp_font_color: "255,255,255".to_string(),
            border_color: "255,255,255".to_string(),
            filters: None,
            watermark: None,
            watermark_all: None,
            seed: None,
            output: DEFAULT_OUTPUT_PATTERN.to_string(),
            single_images: false,
            webvtt: false,
            overwrite: false,
            skip_existing: false,
        }
    }
}

impl SheetOptions {
    /// Parse options from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Config`] for malformed TOML, unknown keys or
    /// wrongly typed values.
    pub fn from_toml(text: &str) -> Result<Self, SheetError> {
        toml::from_str(text).map_err(|error| SheetError::Config(error.to_string()))
    }

    /// Read options from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Config`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, SheetError> {
        let text = std::fs::read_to_string(path).map_err(|error| {
            SheetError::Config(format!("cannot read {}: {error}", path.display()))
        })?;
        Self::from_toml(&text).map_err(|error| match error {
            SheetError::Config(reason) => {
                SheetError::Config(format!("{}: {reason}", path.display()))
            }
            other => other,
        })
    }

    /// Load `explicit` if given, otherwise [`DEFAULT_CONFIG_FILE`] from the
    /// working directory when present, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// Propagates [`load`](Self::load) failures.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, SheetError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            log::debug!("Using configuration from {}", fallback.display());
            return Self::load(fallback);
        }
        Ok(Self::default())
    }

    /// Check option values that are not representable as types.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Config`] naming the first offending option.
    pub fn validate(&self) -> Result<(), SheetError> {
        if self.columns == 0 {
            return Err(SheetError::Config("columns must be at least 1".to_string()));
        }
        if self.width == 0 {
            return Err(SheetError::Config("width must be at least 1".to_string()));
        }
        if self.interval == 0 && self.numcaps == 0 {
            return Err(SheetError::Config(
                "numcaps must be at least 1 when no interval is set".to_string(),
            ));
        }
        for (name, value) in [
            ("blank_threshold", self.blank_threshold),
            ("blur_threshold", self.blur_threshold),
        ] {
            if value > 100 {
                return Err(SheetError::Config(format!(
                    "{name} must be between 0 and 100, got {value}"
                )));
            }
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(SheetError::Config(format!(
                "font_size must be positive, got {}",
                self.font_size
            )));
        }
        if self.overwrite && self.skip_existing {
            return Err(SheetError::Config(
                "overwrite and skip_existing cannot both be set".to_string(),
            ));
        }
        self.colors()?;
        self.filter_list()?;
        self.plan_options()?;
        Ok(())
    }

    /// Timestamp planner options.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::TimestampParse`] for malformed `from`/`to`.
    pub fn plan_options(&self) -> Result<PlanOptions, SheetError> {
        let from = parse_timestamp(&self.from)?;
        let to = self.to.as_deref().map(parse_timestamp).transpose()?;
        let plan = if self.interval > 0 {
            PlanOptions::interval(std::time::Duration::from_secs(u64::from(self.interval)))
        } else {
            PlanOptions::count(self.numcaps)
        };
        Ok(plan.with_range(from, to).with_skip_credits(self.skip_credits))
    }

    /// Quality gate built from the skip flags and thresholds.
    pub fn quality_gate(&self) -> QualityGate {
        QualityGate {
            skip_blank: self.skip_blank,
            blank_threshold: self.blank_threshold,
            skip_blurry: self.skip_blurry,
            blur_threshold: self.blur_threshold,
            safe_content: self.sfw,
        }
    }

    /// Frame acquisition options.
    pub fn acquisition_options(&self) -> AcquisitionOptions {
        AcquisitionOptions {
            seek_mode: SeekMode::from_fast_flag(self.fast),
            max_retries: self.max_retries,
            retry_step: RETRY_STEP,
            gate: self.quality_gate(),
        }
    }

    /// Compositor options.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Config`] for malformed colours or filters.
    pub fn composite_options(&self) -> Result<CompositeOptions, SheetError> {
        let colors = self.colors()?;
        Ok(CompositeOptions {
            columns: self.columns,
            thumbnail_width: self.width,
            thumbnail_height: self.height,
            padding: self.padding,
            border_width: self.border,
            header: self.header,
            header_meta: self.header_meta,
            comment: self.comment.clone(),
            timestamps: self.timestamps,
            font_size: self.font_size,
            background: colors.background,
            header_background: colors.header_background,
            header_font_color: colors.header_font_color,
            timestamp_font_color: colors.timestamp_font_color,
            border_color: colors.border_color,
            filters: self.filter_list()?,
            seed: self.seed,
        })
    }

    fn filter_list(&self) -> Result<Vec<Filter>, SheetError> {
        self.filters
            .as_deref()
            .map_or_else(|| Ok(Vec::new()), parse_filters)
    }

    fn colors(&self) -> Result<Colors, SheetError> {
        Ok(Colors {
            background: parse_color(&self.background)?,
            header_background: parse_color(&self.header_background)?,
            header_font_color: parse_color(&self.header_font_color)?,
            timestamp_font_color: parse_color(&self.timestamp_font_color)?,
            border_color: parse_color(&self.border_color)?,
        })
    }
}

struct Colors {
    background: Rgba<u8>,
    header_background: Rgba<u8>,
    header_font_color: Rgba<u8>,
    timestamp_font_color: Rgba<u8>,
    border_color: Rgba<u8>,
}

/// Parse `R,G,B` or `R,G,B,A` with decimal components. Alpha defaults to 255.
///
/// # Errors
///
/// Returns [`SheetError::Config`] for a wrong component count or a value
/// outside `0..=255`.
///
/// # Example
///
/// ```
/// use image::Rgba;
/// use vidsheet::config::parse_color;
///
/// assert_eq!(parse_color("255, 0, 0").unwrap(), Rgba([255, 0, 0, 255]));
/// assert_eq!(parse_color("0,0,0,128").unwrap(), Rgba([0, 0, 0, 128]));
/// assert!(parse_color("red").is_err());
/// ```
pub fn parse_color(value: &str) -> Result<Rgba<u8>, SheetError> {
    let components = value
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|error| SheetError::Config(format!("invalid colour {value:?}: {error}")))?;
    match components[..] {
        [r, g, b] => Ok(Rgba([r, g, b, 255])),
        [r, g, b, a] => Ok(Rgba([r, g, b, a])),
        _ => Err(SheetError::Config(format!(
            "invalid colour {value:?}: expected R,G,B or R,G,B,A"
        ))),
    }
}
