//! WebVTT cue sheet for video scrubbers.
//!
//! Each cue spans the interval between two consecutive display timestamps and
//! points at the thumbnail's rectangle inside the composite image using a
//! spatial media fragment (`name.jpg#xywh=x,y,w,h`).
//!
//! ```text
//! WEBVTT
//!
//! 00:00:00.000 --> 00:00:30.000
//! sheet.jpg#xywh=10,60,400,225
//! ```

use std::{fmt::Write as _, path::Path, time::Duration};

use crate::{error::SheetError, layout::ThumbnailRect, timestamp::format_cue_timestamp};

/// Render a cue sheet.
///
/// `display` must hold one more entry than `rects` (see
/// [`display_plan`](crate::timestamp::display_plan)); cue `i` runs from
/// `display[i]` to `display[i + 1]`. Extra entries on either side are
/// ignored.
pub fn render_cue_sheet(image_name: &str, display: &[Duration], rects: &[ThumbnailRect]) -> String {
    let mut vtt = String::from("WEBVTT\n\n");
    for (window, rect) in display.windows(2).zip(rects) {
        // Writing into a String cannot fail.
        let _ = write!(
            vtt,
            "{} --> {}\n{image_name}#xywh={},{},{},{}\n\n",
            format_cue_timestamp(window[0]),
            format_cue_timestamp(window[1]),
            rect.x,
            rect.y,
            rect.width,
            rect.height,
        );
    }
    vtt
}

/// Render and write a cue sheet to `path`.
///
/// # Errors
///
/// Returns [`SheetError::IoError`] if the file cannot be written.
pub fn write_cue_sheet(
    path: &Path,
    image_name: &str,
    display: &[Duration],
    rects: &[ThumbnailRect],
) -> Result<(), SheetError> {
    if display.len() != rects.len() + 1 {
        log::warn!(
            "Cue sheet has {} display timestamps for {} thumbnails",
            display.len(),
            rects.len()
        );
    }
    std::fs::write(path, render_cue_sheet(image_name, display, rects))?;
    log::info!("Wrote cue sheet {}", path.display());
    Ok(())
}
