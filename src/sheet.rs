//! One contact sheet run, from input path to written files.
//!
//! [`generate`] is the in-memory part: plan timestamps, acquire frames and
//! compose them. It works with any [`FrameDecoder`]. [`run`] wraps it with
//! everything that touches the file system: opening the video, loading the
//! font and watermarks, and writing the outputs.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use vidsheet::{NoOpProgress, SheetOptions, sheet};
//!
//! let options = SheetOptions {
//!     numcaps: 12,
//!     columns: 3,
//!     ..SheetOptions::default()
//! };
//! let summary = sheet::run("holiday.mp4", &options, Arc::new(NoOpProgress))?;
//! println!("wrote {:?}", summary.composite);
//! # Ok::<(), vidsheet::SheetError>(())
//! ```

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use image::RgbaImage;

use crate::{
    acquisition::acquire_frames,
    compositor::{CompositeResources, compose},
    config::SheetOptions,
    cue_sheet::write_cue_sheet,
    decoder::{FfmpegDecoder, Frame, FrameDecoder},
    error::SheetError,
    layout::{CompositeLayout, ThumbnailRect},
    metadata::VideoMetadata,
    output::{
        OverwritePolicy, cue_sheet_path, image_reference, load_watermark, resolve_collision,
        resolve_output_pattern, save_image, save_single_images,
    },
    progress::ProgressCallback,
    text::TextRenderer,
    timestamp::{display_plan, extraction_plan},
};

/// Font and watermark images shared by every sheet of a batch.
#[derive(Debug, Clone, Default)]
pub struct SheetResources {
    /// Font for labels and header; `None` leaves text out.
    pub font: Option<TextRenderer>,
    /// Centred watermark.
    pub watermark: Option<RgbaImage>,
    /// Per-thumbnail watermark.
    pub watermark_all: Option<RgbaImage>,
}

impl SheetResources {
    /// Load what `options` asks for.
    ///
    /// A missing font only produces a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured watermark cannot be loaded.
    pub fn load(options: &SheetOptions) -> Result<Self, SheetError> {
        let font = if options.header || options.timestamps {
            TextRenderer::load_or_warn(options.font.as_deref())
        } else {
            None
        };
        Ok(Self {
            font,
            watermark: options.watermark.as_deref().map(load_watermark).transpose()?,
            watermark_all: options
                .watermark_all
                .as_deref()
                .map(load_watermark)
                .transpose()?,
        })
    }
}

/// A composed sheet together with everything needed to write it.
#[derive(Debug)]
pub struct SheetOutput {
    /// The composite image.
    pub image: RgbaImage,
    /// Geometry the image was built with.
    pub layout: CompositeLayout,
    /// Placement of each accepted frame.
    pub rects: Vec<ThumbnailRect>,
    /// Cue boundaries over the full duration, one more than `rects`.
    pub display: Vec<Duration>,
    /// Accepted frames in extraction order.
    pub frames: Vec<Frame>,
    /// Metadata of the source.
    pub metadata: VideoMetadata,
}

/// Plan, acquire and compose a sheet from `decoder`.
///
/// # Errors
///
/// Returns option, planning and composition errors, and
/// [`SheetError::NoValidFrames`] when no frame could be decoded.
pub fn generate<D: FrameDecoder + ?Sized>(
    decoder: &mut D,
    options: &SheetOptions,
    resources: &SheetResources,
    progress: Arc<dyn ProgressCallback>,
) -> Result<SheetOutput, SheetError> {
    let metadata = decoder.metadata().clone();
    let plan = extraction_plan(&options.plan_options()?, metadata.duration)?;
    log::info!(
        "Extracting {} frame(s) from {}",
        plan.len(),
        metadata.filename
    );

    let frames = acquire_frames(
        decoder,
        &plan,
        &options.acquisition_options(),
        Arc::clone(&progress),
    )?;

    let composite_resources = CompositeResources {
        font: resources.font.as_ref(),
        watermark: resources.watermark.as_ref(),
        watermark_all: resources.watermark_all.as_ref(),
        progress,
    };
    let sheet = compose(
        &frames,
        &metadata,
        &options.composite_options()?,
        &composite_resources,
    )?;

    Ok(SheetOutput {
        image: sheet.image,
        layout: sheet.layout,
        rects: sheet.rects,
        display: display_plan(metadata.duration, frames.len()),
        frames,
        metadata,
    })
}

/// Files produced by one [`run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// The input video.
    pub input: PathBuf,
    /// Path of the composite, `None` when the input was skipped.
    pub composite: Option<PathBuf>,
    /// Individual frame images.
    pub single_images: Vec<PathBuf>,
    /// The WebVTT cue sheet.
    pub cue_sheet: Option<PathBuf>,
    /// Number of thumbnails on the sheet.
    pub frame_count: usize,
    /// The output existed and `skip_existing` was set.
    pub skipped: bool,
}

/// Generate the sheet for `path` and write it according to `options`.
///
/// # Errors
///
/// Returns the first fatal error: invalid options, an unreadable video, no
/// decodable frames, or a failed write.
pub fn run<P: AsRef<Path>>(
    path: P,
    options: &SheetOptions,
    progress: Arc<dyn ProgressCallback>,
) -> Result<RunSummary, SheetError> {
    let resources = SheetResources::load(options)?;
    run_with_resources(path, options, &resources, progress)
}

/// Like [`run`], reusing already loaded resources across a batch.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_resources<P: AsRef<Path>>(
    path: P,
    options: &SheetOptions,
    resources: &SheetResources,
    progress: Arc<dyn ProgressCallback>,
) -> Result<RunSummary, SheetError> {
    let input = path.as_ref();
    options.validate()?;

    let pattern_path = resolve_output_pattern(&options.output, input);
    let policy = OverwritePolicy::from_flags(options.overwrite, options.skip_existing);
    let Some(composite_path) = resolve_collision(&pattern_path, policy) else {
        log::info!("Skipping {}, {} exists", input.display(), pattern_path.display());
        return Ok(RunSummary {
            input: input.to_path_buf(),
            skipped: true,
            ..RunSummary::default()
        });
    };

    let mut decoder = FfmpegDecoder::open(input)?;
    let output = generate(&mut decoder, options, resources, progress);
    decoder.close();
    let output = output?;

    save_image(&output.image, &composite_path)?;
    log::info!("Wrote contact sheet {}", composite_path.display());

    let single_images = if options.single_images {
        save_single_images(&output.frames, &composite_path, policy)?
    } else {
        Vec::new()
    };
    let frame_count = output.frames.len();
    drop(output.frames);

    let planned_cue_sheet = options.webvtt.then(|| cue_sheet_path(&composite_path));
    let cue_sheet = match planned_cue_sheet {
        Some(planned) => match resolve_collision(&planned, policy) {
            Some(vtt_path) => {
                write_cue_sheet(
                    &vtt_path,
                    &image_reference(&composite_path),
                    &output.display,
                    &output.rects,
                )?;
                Some(vtt_path)
            }
            None => {
                log::info!("Keeping existing {}", planned.display());
                None
            }
        },
        None => None,
    };

    Ok(RunSummary {
        input: input.to_path_buf(),
        composite: Some(composite_path),
        single_images,
        cue_sheet,
        frame_count,
        skipped: false,
    })
}
