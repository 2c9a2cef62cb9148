//! Internal utility functions.
//!
//! Helpers for pixel-data copying and time-base conversion shared by the
//! decoder.

use std::time::Duration;

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy pixel data from a packed FFmpeg video frame into a tightly-packed
/// buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × bpp).
/// This strips that padding so the result can be passed directly to
/// [`image::RgbImage::from_raw`].
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_length = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == row_length {
        data[..row_length * (height as usize)].to_vec()
    } else {
        data.chunks(stride)
            .take(height as usize)
            .flat_map(|row| &row[..row_length])
            .copied()
            .collect()
    }
}

/// Convert a [`Duration`] to a seek target in AV_TIME_BASE (microseconds).
///
/// `Input::seek` goes through `avformat_seek_file` with `stream_index = -1`,
/// which expects container-level timestamps.
pub(crate) fn duration_to_seek_timestamp(duration: Duration) -> i64 {
    i64::try_from(duration.as_micros()).unwrap_or(i64::MAX)
}

/// Rescale a PTS value from stream time base to a [`Duration`].
///
/// Negative values (possible with edit lists) clamp to zero.
pub(crate) fn pts_to_duration(pts: i64, time_base: Rational) -> Duration {
    let denominator = time_base.denominator();
    if denominator == 0 {
        return Duration::ZERO;
    }
    let seconds = pts as f64 * time_base.numerator() as f64 / denominator as f64;
    if seconds.is_finite() && seconds > 0.0 {
        Duration::from_secs_f64(seconds)
    } else {
        Duration::ZERO
    }
}

/// Convert an FFmpeg rational to a float, treating a zero denominator as 0.
pub(crate) fn rational_to_f64(rational: Rational) -> f64 {
    if rational.denominator() == 0 {
        0.0
    } else {
        rational.numerator() as f64 / rational.denominator() as f64
    }
}
