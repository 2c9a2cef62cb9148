//! Contact sheet geometry.
//!
//! [`CompositeLayout`] is the one place where thumbnail positions are
//! computed. The compositor places thumbnails with
//! [`thumbnail_rect`](CompositeLayout::thumbnail_rect) and the cue sheet
//! reads the very same rectangles, so the scrubber track cannot drift from
//! the picture.

use crate::error::SheetError;

/// Pixel rectangle of one thumbnail on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThumbnailRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Grid geometry for a given number of thumbnails.
///
/// ```text
/// +----------------------------------+
/// | header (header_height, may be 0) |
/// +----------------------------------+
/// | pad | thumb | pad | thumb | pad  |
/// |     ...                          |
/// +----------------------------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeLayout {
    /// Number of thumbnails laid out.
    pub frame_count: u32,
    /// Thumbnails per row.
    pub columns: u32,
    /// Number of rows, `ceil(frame_count / columns)`.
    pub rows: u32,
    /// Width of each thumbnail.
    pub thumbnail_width: u32,
    /// Height of each thumbnail.
    pub thumbnail_height: u32,
    /// Gap around and between thumbnails.
    pub padding: u32,
    /// Height of the header band above the grid.
    pub header_height: u32,
}

impl CompositeLayout {
    /// Build the layout for `frame_count` thumbnails.
    ///
    /// # Errors
    ///
    /// - [`SheetError::NoFrames`] if `frame_count` is zero.
    /// - [`SheetError::InvalidLayout`] for zero columns, zero-sized
    ///   thumbnails, or a grid too large to address in `u32` pixels.
    pub fn new(
        frame_count: u32,
        columns: u32,
        thumbnail_width: u32,
        thumbnail_height: u32,
        padding: u32,
        header_height: u32,
    ) -> Result<Self, SheetError> {
        if frame_count == 0 {
            return Err(SheetError::NoFrames);
        }
        if columns == 0 {
            return Err(SheetError::InvalidLayout(
                "columns must be at least 1".to_string(),
            ));
        }
        if thumbnail_width == 0 || thumbnail_height == 0 {
            return Err(SheetError::InvalidLayout(format!(
                "thumbnail size {thumbnail_width}x{thumbnail_height} is empty"
            )));
        }

        let layout = Self {
            frame_count,
            columns,
            rows: frame_count.div_ceil(columns),
            thumbnail_width,
            thumbnail_height,
            padding,
            header_height,
        };
        // Every rectangle lies inside the canvas, so checking the canvas
        // bounds covers the arithmetic of `thumbnail_rect` too.
        let width = grid_extent(columns, thumbnail_width, padding);
        let height = grid_extent(layout.rows, thumbnail_height, padding)
            .and_then(|content| content.checked_add(header_height));
        match (width, height) {
            (Some(_), Some(_)) => Ok(layout),
            _ => Err(SheetError::InvalidLayout(format!(
                "{columns} columns of {thumbnail_width}x{thumbnail_height} thumbnails \
                 in {} rows do not fit a canvas",
                layout.rows
            ))),
        }
    }

    /// Width of the grid area, which is also the canvas width.
    pub fn content_width(&self) -> u32 {
        self.columns * self.thumbnail_width + (self.columns + 1) * self.padding
    }

    /// Height of the grid area below the header.
    pub fn content_height(&self) -> u32 {
        self.rows * self.thumbnail_height + (self.rows + 1) * self.padding
    }

    /// Total canvas height, header included.
    pub fn total_height(&self) -> u32 {
        self.header_height + self.content_height()
    }

    /// Canvas dimensions as `(width, height)`.
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.content_width(), self.total_height())
    }

    /// Position and size of thumbnail `index` (row-major order).
    pub fn thumbnail_rect(&self, index: u32) -> ThumbnailRect {
        let column = index % self.columns;
        let row = index / self.columns;
        ThumbnailRect {
            x: self.padding + column * (self.thumbnail_width + self.padding),
            y: self.header_height + self.padding + row * (self.thumbnail_height + self.padding),
            width: self.thumbnail_width,
            height: self.thumbnail_height,
        }
    }

    /// Rectangles of all thumbnails in order.
    pub fn thumbnail_rects(&self) -> Vec<ThumbnailRect> {
        (0..self.frame_count)
            .map(|index| self.thumbnail_rect(index))
            .collect()
    }
}

/// `count * size + (count + 1) * padding`, or `None` past `u32::MAX`.
fn grid_extent(count: u32, size: u32, padding: u32) -> Option<u32> {
    let cells = count.checked_mul(size)?;
    let gaps = count.checked_add(1)?.checked_mul(padding)?;
    cells.checked_add(gaps)
}

/// Resolve the thumbnail size.
///
/// A `height` of 0 is derived from `width` and the source aspect ratio
/// (`source_width` × `source_height`), rounded and at least 1 pixel.
pub fn resolve_thumbnail_size(
    width: u32,
    height: u32,
    source_width: u32,
    source_height: u32,
) -> (u32, u32) {
    if height > 0 || source_width == 0 {
        return (width, height);
    }
    let ratio = width as f64 / source_width as f64;
    let derived = (source_height as f64 * ratio).round() as u32;
    (width, derived.max(1))
}
