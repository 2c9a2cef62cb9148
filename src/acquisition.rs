//! Frame acquisition.
//!
//! For every planned extraction timestamp (a *slot*) the loop asks the
//! decoder for a frame and runs it through the [`QualityGate`]. A missing
//! or rejected frame moves the working timestamp forward by
//! [`RETRY_STEP`] and tries again, for at most `max_retries` decode attempts
//! per slot. When no attempt is accepted, the last frame that did decode is
//! kept as a fallback; the slot is dropped only if nothing decoded at all.
//!
//! Accepted and fallback frames carry the slot's *original* timestamp, not
//! the retry-adjusted one, so labels on the sheet match the plan.

use std::{sync::Arc, time::Duration};

use crate::{
    decoder::{Frame, FrameDecoder, SeekMode},
    error::SheetError,
    progress::{OperationType, ProgressCallback, ProgressTracker},
    quality::{QualityGate, Verdict},
    timestamp::format_timestamp,
};

/// Default number of decode attempts per slot.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// How far each retry moves past the previous attempt.
pub const RETRY_STEP: Duration = Duration::from_secs(1);

/// Settings for the acquisition loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionOptions {
    /// Seek precision.
    pub seek_mode: SeekMode,
    /// Decode attempts per slot. Zero behaves like one.
    pub max_retries: u32,
    /// Offset added per retry.
    pub retry_step: Duration,
    /// Checks a decoded frame must pass.
    pub gate: QualityGate,
}

impl Default for AcquisitionOptions {
    fn default() -> Self {
        Self {
            seek_mode: SeekMode::Accurate,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_step: RETRY_STEP,
            gate: QualityGate::default(),
        }
    }
}

/// What became of one slot.
#[derive(Debug)]
pub enum SlotOutcome {
    /// A frame passed the gate.
    Accepted(Frame),
    /// Every attempt was rejected; this is the last frame that decoded.
    Fallback(Frame),
    /// No attempt produced a frame.
    Dropped,
}

impl SlotOutcome {
    /// The frame to keep, if any.
    pub fn into_frame(self) -> Option<Frame> {
        match self {
            SlotOutcome::Accepted(frame) | SlotOutcome::Fallback(frame) => Some(frame),
            SlotOutcome::Dropped => None,
        }
    }
}

/// Acquire a frame for a single slot.
///
/// Decode errors count as failed attempts; they are logged and retried
/// like an end of stream.
pub fn acquire_slot<D: FrameDecoder + ?Sized>(
    decoder: &mut D,
    timestamp: Duration,
    options: &AcquisitionOptions,
) -> SlotOutcome {
    let attempts = options.max_retries.max(1);
    let mut last_decoded: Option<Frame> = None;

    for attempt in 0..attempts {
        let working = timestamp + options.retry_step * attempt;

        match decoder.seek_and_decode(working, options.seek_mode) {
            Ok(Some(mut frame)) => {
                frame.timestamp = timestamp;
                match options.gate.evaluate(&frame.image) {
                    Verdict::Accept => {
                        log::debug!(
                            "Accepted frame for {} on attempt {}",
                            format_timestamp(timestamp),
                            attempt + 1
                        );
                        return SlotOutcome::Accepted(frame);
                    }
                    Verdict::Reject(reason) => {
                        log::debug!(
                            "Frame at {} rejected ({reason:?}), attempt {}/{attempts}",
                            format_timestamp(working),
                            attempt + 1
                        );
                        // Replacing the previous fallback releases it.
                        last_decoded = Some(frame);
                    }
                }
            }
            Ok(None) => {
                log::debug!(
                    "No frame at {}, attempt {}/{attempts}",
                    format_timestamp(working),
                    attempt + 1
                );
            }
            Err(error) => {
                log::warn!(
                    "Decoding at {} failed: {error} (attempt {}/{attempts})",
                    format_timestamp(working),
                    attempt + 1
                );
            }
        }
    }

    match last_decoded {
        Some(frame) => {
            log::info!(
                "No frame near {} passed the quality checks, using the last one decoded",
                format_timestamp(timestamp)
            );
            SlotOutcome::Fallback(frame)
        }
        None => {
            log::warn!("Dropping slot at {}", format_timestamp(timestamp));
            SlotOutcome::Dropped
        }
    }
}

/// Acquire frames for every timestamp in `plan`, in order.
///
/// # Errors
///
/// Returns [`SheetError::NoValidFrames`] when every slot was dropped. Some
/// dropped slots only produce a warning.
pub fn acquire_frames<D: FrameDecoder + ?Sized>(
    decoder: &mut D,
    plan: &[Duration],
    options: &AcquisitionOptions,
    progress: Arc<dyn ProgressCallback>,
) -> Result<Vec<Frame>, SheetError> {
    let mut tracker = ProgressTracker::new(
        progress,
        OperationType::FrameAcquisition,
        Some(plan.len() as u64),
    );

    let mut frames = Vec::with_capacity(plan.len());
    for &timestamp in plan {
        if let Some(frame) = acquire_slot(decoder, timestamp, options).into_frame() {
            frames.push(frame);
        }
        tracker.advance(Some(timestamp));
    }

    if frames.is_empty() {
        return Err(SheetError::NoValidFrames {
            attempted: plan.len(),
        });
    }
    if frames.len() < plan.len() {
        log::warn!(
            "Only {} of {} planned frames could be decoded",
            frames.len(),
            plan.len()
        );
    }
    Ok(frames)
}
