//! Timestamp parsing, formatting, and planning.
//!
//! Two independent timestamp sequences are computed per run:
//!
//! - the **extraction plan** ([`extraction_plan`]): where the decoder seeks.
//!   It honours `from`/`to` bounds and credit skipping, and never targets
//!   the very last instant of the usable range.
//! - the **display plan** ([`display_plan`]): evenly spaced boundaries over
//!   the *whole* video, one interval per accepted frame, used only for the
//!   scrubber cue sheet.
//!
//! The two are deliberately computed by different formulas and must not be
//! derived from one another.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use vidsheet::timestamp::{PlanOptions, display_plan, extraction_plan};
//!
//! let options = PlanOptions::count(3);
//! let plan = extraction_plan(&options, Duration::from_secs(100))?;
//! assert_eq!(plan, vec![
//!     Duration::from_secs(25),
//!     Duration::from_secs(50),
//!     Duration::from_secs(75),
//! ]);
//!
//! let cues = display_plan(Duration::from_secs(90), 3);
//! assert_eq!(cues.len(), 4);
//! # Ok::<(), vidsheet::SheetError>(())
//! ```

use std::time::Duration;

use crate::error::SheetError;

/// Longest stretch skipped at the end when credit skipping is enabled.
pub const MAX_CREDITS: Duration = Duration::from_secs(120);

/// Fraction of the duration skipped when that is shorter than [`MAX_CREDITS`].
pub const CREDITS_FRACTION: f64 = 0.1;

/// Inputs of the extraction planner.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct PlanOptions {
    /// Number of timestamps in count mode.
    pub count: u32,
    /// Fixed spacing; when set and non-zero it replaces count mode.
    pub interval: Option<Duration>,
    /// Start of the usable range.
    pub from: Duration,
    /// End of the usable range, `None` for the full duration.
    pub to: Option<Duration>,
    /// Drop the closing credits (see [`credits_length`]).
    pub skip_credits: bool,
}

impl PlanOptions {
    /// Count mode over the whole video.
    pub fn count(count: u32) -> Self {
        Self {
            count,
            interval: None,
            from: Duration::ZERO,
            to: None,
            skip_credits: false,
        }
    }

    /// Interval mode over the whole video.
    pub fn interval(interval: Duration) -> Self {
        Self {
            interval: Some(interval),
            ..Self::count(0)
        }
    }

    /// Restrict planning to `from..to`.
    pub fn with_range(mut self, from: Duration, to: Option<Duration>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Enable or disable credit skipping.
    pub fn with_skip_credits(mut self, skip: bool) -> Self {
        self.skip_credits = skip;
        self
    }
}

/// Length of the closing-credits section: the smaller of two minutes and a
/// tenth of the duration.
pub fn credits_length(duration: Duration) -> Duration {
    duration.mul_f64(CREDITS_FRACTION).min(MAX_CREDITS)
}

/// Compute where the decoder should seek.
///
/// In count mode the usable range is divided into `count + 1` steps and the
/// inner boundaries are returned, so the last timestamp stays strictly before
/// the end of the range. A count of 0 or 1 yields the midpoint. In interval
/// mode timestamps start at `from` and continue while below `to`.
///
/// # Errors
///
/// - [`SheetError::InvalidRange`] if the video has no duration or `from` is
///   not before the resolved end.
/// - [`SheetError::InvalidTimestamp`] if `from` lies beyond the video.
pub fn extraction_plan(
    options: &PlanOptions,
    duration: Duration,
) -> Result<Vec<Duration>, SheetError> {
    if duration.is_zero() {
        return Err(SheetError::InvalidRange {
            start: format_timestamp(Duration::ZERO),
            end: format_timestamp(duration),
        });
    }

    let from = options.from;
    if from >= duration {
        return Err(SheetError::InvalidTimestamp(from));
    }

    let mut to = options.to.unwrap_or(duration);
    if options.skip_credits {
        let skipped = credits_length(duration);
        log::debug!("Skipping {skipped:?} of credits");
        to = duration - skipped;
    }
    to = to.min(duration);

    if from >= to {
        return Err(SheetError::InvalidRange {
            start: format_timestamp(from),
            end: format_timestamp(to),
        });
    }
    let working = to - from;

    if let Some(interval) = options.interval.filter(|interval| !interval.is_zero()) {
        let plan: Vec<Duration> = std::iter::successors(Some(from), |previous| {
            previous.checked_add(interval)
        })
        .take_while(|timestamp| *timestamp < to)
        .collect();
        log::debug!(
            "Planned {} timestamp(s) every {interval:?} between {from:?} and {to:?}",
            plan.len()
        );
        return Ok(plan);
    }

    if options.count <= 1 {
        return Ok(vec![from + working / 2]);
    }

    // `count + 1` keeps the last sample off the final instant of the range,
    // which many decoders cannot produce.
    let step = working / (options.count + 1);
    let plan = (1..=options.count).map(|index| from + step * index).collect();
    Ok(plan)
}

/// Compute cue boundaries for the scrubber track.
///
/// Returns `accepted + 1` evenly spaced values from zero to the full,
/// untrimmed `duration`. Consecutive pairs are the cue ranges of the
/// accepted frames, in order.
pub fn display_plan(duration: Duration, accepted: usize) -> Vec<Duration> {
    if accepted == 0 {
        return vec![Duration::ZERO];
    }
    let step = duration.as_secs_f64() / accepted as f64;
    let mut plan = Vec::with_capacity(accepted + 1);
    plan.push(Duration::ZERO);
    plan.extend((1..accepted).map(|index| Duration::from_secs_f64(step * index as f64)));
    plan.push(duration);
    plan
}

/// Parse `SS[.fff]`, `MM:SS[.fff]` or `HH:MM:SS[.fff]`.
///
/// # Errors
///
/// Returns [`SheetError::TimestampParse`] for empty, negative or malformed
/// input.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use vidsheet::timestamp::parse_timestamp;
///
/// assert_eq!(parse_timestamp("01:15")?, Duration::from_secs(75));
/// assert_eq!(parse_timestamp("00:01:15.5")?, Duration::from_millis(75_500));
/// # Ok::<(), vidsheet::SheetError>(())
/// ```
pub fn parse_timestamp(value: &str) -> Result<Duration, SheetError> {
    let parse_error = |reason: &str| SheetError::TimestampParse {
        input: value.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(parse_error("time value cannot be empty"));
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [seconds] => ("0", "0", *seconds),
        [minutes, seconds] => ("0", *minutes, *seconds),
        [hours, minutes, seconds] => (*hours, *minutes, *seconds),
        _ => return Err(parse_error("expected SS, MM:SS or HH:MM:SS")),
    };

    let hours: u64 = hours
        .parse()
        .map_err(|_| parse_error("hours must be a whole number"))?;
    let minutes: u64 = minutes
        .parse()
        .map_err(|_| parse_error("minutes must be a whole number"))?;
    let seconds: f64 = seconds
        .parse()
        .map_err(|_| parse_error("seconds must be a number"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(parse_error("seconds must be a non-negative number"));
    }
    if parts.len() > 1 && (seconds >= 60.0 || (parts.len() == 3 && minutes >= 60)) {
        return Err(parse_error("minutes and seconds must be below 60"));
    }

    let whole = hours
        .checked_mul(3600)
        .and_then(|total| total.checked_add(minutes.checked_mul(60)?))
        .ok_or_else(|| parse_error("value out of range"))?;
    let fraction =
        Duration::try_from_secs_f64(seconds).map_err(|_| parse_error("value out of range"))?;
    Duration::from_secs(whole)
        .checked_add(fraction)
        .ok_or_else(|| parse_error("value out of range"))
}

/// Format as `HH:MM:SS`, truncating sub-second precision.
pub fn format_timestamp(timestamp: Duration) -> String {
    let total = timestamp.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total / 60) % 60,
        total % 60
    )
}

/// Format as `HH:MM:SS.mmm` for cue sheets.
pub fn format_cue_timestamp(timestamp: Duration) -> String {
    format!(
        "{}.{:03}",
        format_timestamp(timestamp),
        timestamp.subsec_millis()
    )
}
