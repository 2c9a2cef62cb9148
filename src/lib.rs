//! # vidsheet
//!
//! Contact sheets for video files: a grid of evenly spaced thumbnails with
//! an information header, plus an optional WebVTT cue sheet that lets web
//! players show the thumbnails on their seek bar.
//!
//! Decoding is done by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate; drawing uses
//! [`image`] and [`imageproc`].
//!
//! ## Quick Start
//!
//! ### Write a Sheet
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use vidsheet::{NoOpProgress, SheetOptions, sheet};
//!
//! let summary = sheet::run("input.mp4", &SheetOptions::default(), Arc::new(NoOpProgress)).unwrap();
//! println!("{:?}", summary.composite);
//! ```
//!
//! ### Compose in Memory
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use vidsheet::{FfmpegDecoder, NoOpProgress, SheetOptions, sheet};
//!
//! let mut decoder = FfmpegDecoder::open("input.mp4").unwrap();
//! let options = SheetOptions {
//!     numcaps: 9,
//!     columns: 3,
//!     skip_blank: true,
//!     ..SheetOptions::default()
//! };
//! let output = sheet::generate(
//!     &mut decoder,
//!     &options,
//!     &sheet::SheetResources::default(),
//!     Arc::new(NoOpProgress),
//! )
//! .unwrap();
//! output.image.save("sheet.png").unwrap();
//! ```
//!
//! ## Pipeline
//!
//! 1. [`timestamp::extraction_plan`] picks where to seek.
//! 2. [`acquisition::acquire_frames`] decodes a frame per slot, retrying
//!    frames rejected by the [`QualityGate`].
//! 3. [`compositor::compose`] lays the frames out on a canvas.
//! 4. [`output`] and [`cue_sheet`] write the results.
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `rayon` | Prepare thumbnails on rayon's thread pool |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod acquisition;
pub mod compositor;
pub mod config;
pub mod cue_sheet;
pub mod decoder;
pub mod error;
pub mod ffmpeg;
pub mod filter;
pub mod header;
pub mod layout;
pub mod metadata;
pub mod output;
pub mod progress;
pub mod quality;
pub mod sheet;
pub mod text;
pub mod timestamp;
mod utilities;
pub mod validation;

pub use acquisition::{AcquisitionOptions, SlotOutcome};
pub use compositor::{CompositeOptions, CompositeResources, ContactSheet};
pub use config::SheetOptions;
pub use decoder::{FfmpegDecoder, Frame, FrameDecoder, SeekMode};
pub use error::SheetError;
pub use ffmpeg::sync_ffmpeg_log_level;
pub use filter::Filter;
pub use layout::{CompositeLayout, ThumbnailRect};
pub use metadata::VideoMetadata;
pub use output::OverwritePolicy;
pub use progress::{NoOpProgress, OperationType, ProgressCallback, ProgressInfo};
pub use quality::{QualityGate, Rejection, Verdict};
pub use sheet::{RunSummary, SheetOutput, SheetResources};
pub use text::TextRenderer;
pub use timestamp::PlanOptions;
pub use validation::ValidationReport;
