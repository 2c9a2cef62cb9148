//! Contact sheet composition.
//!
//! [`compose`] turns the accepted frames into one image:
//!
//! 1. derive the thumbnail size (height from the first frame's aspect ratio
//!    when unset) and build the [`CompositeLayout`];
//! 2. fill a canvas with the background colour;
//! 3. for each frame: resize, apply filters, draw the timestamp label and
//!    border, apply the per-thumbnail watermark, and place it at
//!    [`CompositeLayout::thumbnail_rect`];
//! 4. draw the header band;
//! 5. blend the centred watermark.
//!
//! The returned [`ContactSheet`] carries the rectangles used for placement so
//! that the cue sheet never recomputes them.

use std::sync::Arc;

use image::{Rgba, RgbaImage, imageops, imageops::FilterType};
use imageproc::{
    drawing::{Blend, draw_filled_rect_mut, draw_hollow_rect_mut},
    rect::Rect,
};
use rand::{RngCore, SeedableRng, rngs::StdRng};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{
    decoder::Frame,
    error::SheetError,
    filter::Filter,
    header::{HEADER_PADDING, header_height, header_lines},
    layout::{CompositeLayout, ThumbnailRect, resolve_thumbnail_size},
    metadata::VideoMetadata,
    progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker},
    text::TextRenderer,
    timestamp::format_timestamp,
};

/// Opacity used for watermarks.
pub const WATERMARK_OPACITY: f32 = 0.7;

/// Distance of the timestamp label from the thumbnail's bottom-left corner.
pub const LABEL_MARGIN: u32 = 5;

/// Padding between the label text and its backing box.
const LABEL_BOX_PADDING: u32 = 2;

/// Backing box behind timestamp labels.
const LABEL_BOX_COLOR: Rgba<u8> = Rgba([0, 0, 0, 128]);

/// Visual settings of a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeOptions {
    /// Thumbnails per row.
    pub columns: u32,
    /// Thumbnail width in pixels.
    pub thumbnail_width: u32,
    /// Thumbnail height in pixels; 0 derives it from the aspect ratio.
    pub thumbnail_height: u32,
    /// Gap around and between thumbnails.
    pub padding: u32,
    /// Width of the line drawn around each thumbnail; 0 for none.
    pub border_width: u32,
    /// Draw the header band.
    pub header: bool,
    /// Add frame rate, bit rate and codecs to the header.
    pub header_meta: bool,
    /// Extra header line.
    pub comment: Option<String>,
    /// Label each thumbnail with its timestamp.
    pub timestamps: bool,
    /// Font size in pixels for labels and header.
    pub font_size: f32,
    /// Canvas colour.
    pub background: Rgba<u8>,
    /// Header band colour.
    pub header_background: Rgba<u8>,
    /// Header text colour.
    pub header_font_color: Rgba<u8>,
    /// Timestamp label colour.
    pub timestamp_font_color: Rgba<u8>,
    /// Thumbnail border colour.
    pub border_color: Rgba<u8>,
    /// Filters applied to every thumbnail, in order.
    pub filters: Vec<Filter>,
    /// Seed for randomised filters; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        let white = Rgba([255, 255, 255, 255]);
        let black = Rgba([0, 0, 0, 255]);
        Self {
            columns: 2,
            thumbnail_width: 400,
            thumbnail_height: 0,
            padding: 10,
            border_width: 0,
            header: true,
            header_meta: false,
            comment: None,
            timestamps: true,
            font_size: 12.0,
            background: black,
            header_background: black,
            header_font_color: white,
            timestamp_font_color: white,
            border_color: white,
            filters: Vec::new(),
            seed: None,
        }
    }
}

/// Fonts, watermarks and progress reporting used while composing.
#[derive(Clone)]
pub struct CompositeResources<'a> {
    /// Font for labels and header; `None` leaves text out.
    pub font: Option<&'a TextRenderer>,
    /// Centred on the finished sheet.
    pub watermark: Option<&'a RgbaImage>,
    /// Drawn at the top-left of every thumbnail.
    pub watermark_all: Option<&'a RgbaImage>,
    /// Receives one notification per placed thumbnail.
    pub progress: Arc<dyn ProgressCallback>,
}

impl Default for CompositeResources<'_> {
    fn default() -> Self {
        Self {
            font: None,
            watermark: None,
            watermark_all: None,
            progress: Arc::new(NoOpProgress),
        }
    }
}

/// A finished sheet.
#[derive(Debug, Clone)]
pub struct ContactSheet {
    /// The composite image.
    pub image: RgbaImage,
    /// Geometry it was built with.
    pub layout: CompositeLayout,
    /// Placement of each frame, in input order.
    pub rects: Vec<ThumbnailRect>,
}

/// Compose `frames` into a contact sheet.
///
/// # Errors
///
/// - [`SheetError::NoFrames`] for an empty frame list.
/// - [`SheetError::InvalidLayout`] for zero columns or an empty thumbnail
///   size.
///
/// Both are reported before any canvas is allocated. A missing font is not
/// an error: labels and header are skipped with a warning.
pub fn compose(
    frames: &[Frame],
    metadata: &VideoMetadata,
    options: &CompositeOptions,
    resources: &CompositeResources<'_>,
) -> Result<ContactSheet, SheetError> {
    let first = frames.first().ok_or(SheetError::NoFrames)?;
    let (thumbnail_width, thumbnail_height) = resolve_thumbnail_size(
        options.thumbnail_width,
        options.thumbnail_height,
        first.image.width(),
        first.image.height(),
    );

    let lines = if options.header {
        header_lines(metadata, options.header_meta, options.comment.as_deref())
    } else {
        Vec::new()
    };
    let (header_band, line_height) = match (options.header, resources.font) {
        (true, Some(font)) => {
            let line_height = font.line_height(options.font_size);
            (header_height(lines.len(), line_height), line_height)
        }
        (true, None) => {
            log::warn!("No font available, leaving out the sheet header");
            (0, 0)
        }
        (false, _) => (0, 0),
    };

    let frame_count = u32::try_from(frames.len())
        .map_err(|_| SheetError::InvalidLayout(format!("{} frames", frames.len())))?;
    let layout = CompositeLayout::new(
        frame_count,
        options.columns,
        thumbnail_width,
        thumbnail_height,
        options.padding,
        header_band,
    )?;

    let (width, height) = layout.canvas_size();
    log::debug!(
        "Composing {frame_count} thumbnails of {thumbnail_width}x{thumbnail_height} \
         into {width}x{height} ({} columns, {} rows)",
        layout.columns,
        layout.rows
    );
    let mut canvas = RgbaImage::from_pixel(width, height, options.background);

    // Seeds are drawn in index order so parallel preparation stays reproducible.
    let mut seed_source = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let seeds: Vec<u64> = frames.iter().map(|_| seed_source.next_u64()).collect();

    let prepare = |(frame, seed): (&Frame, &u64)| {
        prepare_thumbnail(frame, *seed, &layout, options, resources)
    };
    #[cfg(feature = "rayon")]
    let thumbnails: Vec<RgbaImage> = frames.par_iter().zip(seeds.par_iter()).map(prepare).collect();
    #[cfg(not(feature = "rayon"))]
    let thumbnails: Vec<RgbaImage> = frames.iter().zip(seeds.iter()).map(prepare).collect();

    let mut tracker = ProgressTracker::new(
        Arc::clone(&resources.progress),
        OperationType::Composition,
        Some(frames.len() as u64),
    );
    let rects = layout.thumbnail_rects();
    for ((thumbnail, rect), frame) in thumbnails.iter().zip(&rects).zip(frames) {
        imageops::overlay(&mut canvas, thumbnail, rect.x as i64, rect.y as i64);
        tracker.advance(Some(frame.timestamp));
    }

    if let (Some(font), true) = (resources.font, header_band > 0) {
        draw_filled_rect_mut(
            &mut canvas,
            Rect::at(0, 0).of_size(width, header_band),
            options.header_background,
        );
        for (index, line) in lines.iter().enumerate() {
            let y = HEADER_PADDING + index as u32 * line_height;
            font.draw(
                &mut canvas,
                HEADER_PADDING as i32,
                y as i32,
                options.font_size,
                options.header_font_color,
                line,
            );
        }
    }

    if let Some(watermark) = resources.watermark {
        let x = (width as i64 - watermark.width() as i64) / 2;
        let y = (height as i64 - watermark.height() as i64) / 2;
        imageops::overlay(&mut canvas, &with_opacity(watermark, WATERMARK_OPACITY), x, y);
    }

    Ok(ContactSheet {
        image: canvas,
        layout,
        rects,
    })
}

/// Resize one frame and decorate it for placement.
fn prepare_thumbnail(
    frame: &Frame,
    seed: u64,
    layout: &CompositeLayout,
    options: &CompositeOptions,
    resources: &CompositeResources<'_>,
) -> RgbaImage {
    let (width, height) = (layout.thumbnail_width, layout.thumbnail_height);
    let mut thumbnail = frame
        .image
        .resize_exact(width, height, FilterType::Triangle)
        .to_rgba8();

    let mut rng = StdRng::seed_from_u64(seed);
    for filter in &options.filters {
        thumbnail = filter.apply(thumbnail, &mut rng);
    }

    if options.timestamps {
        if let Some(font) = resources.font {
            draw_timestamp_label(&mut thumbnail, font, options, &format_timestamp(frame.timestamp));
        }
    }

    for inset in 0..options.border_width.min(width / 2).min(height / 2) {
        let rect = Rect::at(inset as i32, inset as i32).of_size(width - 2 * inset, height - 2 * inset);
        draw_hollow_rect_mut(&mut thumbnail, rect, options.border_color);
    }

    if let Some(watermark) = resources.watermark_all {
        imageops::overlay(&mut thumbnail, &with_opacity(watermark, WATERMARK_OPACITY), 0, 0);
    }

    thumbnail
}

/// Text in the bottom-left corner over a translucent box.
fn draw_timestamp_label(
    thumbnail: &mut RgbaImage,
    font: &TextRenderer,
    options: &CompositeOptions,
    label: &str,
) {
    let (text_width, text_height) = font.measure(options.font_size, label);
    let x = LABEL_MARGIN as i32;
    let y = thumbnail.height() as i32 - (LABEL_MARGIN + text_height) as i32;

    let backing = Rect::at(x - LABEL_BOX_PADDING as i32, y - LABEL_BOX_PADDING as i32).of_size(
        text_width + 2 * LABEL_BOX_PADDING,
        text_height + 2 * LABEL_BOX_PADDING,
    );
    let mut blend = Blend(std::mem::take(thumbnail));
    draw_filled_rect_mut(&mut blend, backing, LABEL_BOX_COLOR);
    *thumbnail = blend.0;

    font.draw(
        thumbnail,
        x,
        y,
        options.font_size,
        options.timestamp_font_color,
        label,
    );
}

/// Copy of `image` with every alpha value scaled by `opacity`.
pub fn with_opacity(image: &RgbaImage, opacity: f32) -> RgbaImage {
    let mut faded = image.clone();
    for pixel in faded.pixels_mut() {
        pixel.0[3] = (pixel.0[3] as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
    }
    faded
}
