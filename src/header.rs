//! Sheet header text.

use crate::{metadata::VideoMetadata, timestamp::format_timestamp};

/// Blank space above and below the header text.
pub const HEADER_PADDING: u32 = 10;

/// Human-readable size with binary units, e.g. `"1.50 MiB"`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.2} {unit}")
}

/// Lines printed in the header band.
///
/// With `include_meta` the frame rate, bit rate and codecs are added. A
/// non-empty `comment` becomes the last line.
pub fn header_lines(
    metadata: &VideoMetadata,
    include_meta: bool,
    comment: Option<&str>,
) -> Vec<String> {
    let mut lines = vec![
        format!("File Name: {}", metadata.filename),
        format!("File Size: {}", format_file_size(metadata.file_size)),
        format!("Duration: {}", format_timestamp(metadata.duration)),
        format!("Resolution: {}x{}", metadata.width, metadata.height),
    ];

    if include_meta {
        lines.push(format!("FPS: {:.2}", metadata.frame_rate));
        lines.push(format!("Bitrate: {} kb/s", metadata.bit_rate / 1000));
        let audio = metadata.audio_codec.as_deref().unwrap_or("none");
        lines.push(format!("Codec: {} / {audio}", metadata.video_codec));
    }

    if let Some(comment) = comment.map(str::trim).filter(|comment| !comment.is_empty()) {
        lines.push(comment.to_string());
    }
    lines
}

/// Height of the header band for `line_count` lines.
pub fn header_height(line_count: usize, line_height: u32) -> u32 {
    if line_count == 0 {
        0
    } else {
        line_count as u32 * line_height + 2 * HEADER_PADDING
    }
}
