//! Writing sheets to disk.
//!
//! Output paths come from a pattern such as `{{.Path}}{{.Name}}.jpg`, where
//! `{{.Path}}` is the input's directory (with a trailing separator) and
//! `{{.Name}}` is the input's file stem. The image format follows the
//! extension of the resolved path.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::{decoder::Frame, error::SheetError};

/// What to do when an output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Replace the existing file.
    Replace,
    /// Leave it alone and skip the input.
    Skip,
    /// Write next to it with a `-1`, `-2`, ... suffix.
    #[default]
    Rename,
}

impl OverwritePolicy {
    /// Policy for the `overwrite` and `skip_existing` options.
    pub fn from_flags(overwrite: bool, skip_existing: bool) -> Self {
        match (overwrite, skip_existing) {
            (true, _) => OverwritePolicy::Replace,
            (false, true) => OverwritePolicy::Skip,
            (false, false) => OverwritePolicy::Rename,
        }
    }
}

/// Substitute `{{.Path}}` and `{{.Name}}` in `pattern` for `input`.
///
/// ```
/// use std::path::Path;
/// use vidsheet::output::resolve_output_pattern;
///
/// let path = resolve_output_pattern("{{.Path}}{{.Name}}.jpg", Path::new("videos/clip.mp4"));
/// assert_eq!(path, Path::new("videos/clip.jpg"));
///
/// let bare = resolve_output_pattern("{{.Path}}{{.Name}}.png", Path::new("clip.mkv"));
/// assert_eq!(bare, Path::new("clip.png"));
/// ```
pub fn resolve_output_pattern(pattern: &str, input: &Path) -> PathBuf {
    let directory = match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            format!("{}{}", parent.display(), std::path::MAIN_SEPARATOR)
        }
        _ => String::new(),
    };
    let name = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    PathBuf::from(
        pattern
            .replace("{{.Path}}", &directory)
            .replace("{{.Name}}", &name),
    )
}

/// Apply `policy` to `path`.
///
/// Returns the path to write to, or `None` when the input should be
/// skipped.
pub fn resolve_collision(path: &Path, policy: OverwritePolicy) -> Option<PathBuf> {
    if !path.exists() {
        return Some(path.to_path_buf());
    }
    match policy {
        OverwritePolicy::Replace => Some(path.to_path_buf()),
        OverwritePolicy::Skip => None,
        OverwritePolicy::Rename => (1u32..)
            .map(|suffix| with_stem_suffix(path, &suffix.to_string()))
            .find(|candidate| !candidate.exists()),
    }
}

/// `dir/stem-<suffix>.ext` for `dir/stem.ext`.
fn with_stem_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(extension) => format!("{stem}-{suffix}.{}", extension.to_string_lossy()),
        None => format!("{stem}-{suffix}"),
    };
    path.with_file_name(file_name)
}

/// Encode `image` to `path`, creating parent directories.
///
/// The format follows the extension. Formats without alpha support (JPEG)
/// get the image flattened to RGB.
///
/// # Errors
///
/// Returns [`SheetError::ImageError`] for unknown extensions or encoder
/// failures and [`SheetError::IoError`] if the directory cannot be created.
pub fn save_image(image: &RgbaImage, path: &Path) -> Result<(), SheetError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let format = ImageFormat::from_path(path)?;
    match format {
        ImageFormat::Jpeg | ImageFormat::Bmp | ImageFormat::Pnm => {
            DynamicImage::ImageRgba8(image.clone())
                .to_rgb8()
                .save_with_format(path, format)?;
        }
        _ => image.save_with_format(path, format)?,
    }
    Ok(())
}

/// Path of single image `index` (0-based) out of `total`, derived from the
/// composite path: `sheet.jpg` becomes `sheet-01.jpg` ... `sheet-12.jpg`.
pub fn single_image_path(composite: &Path, index: usize, total: usize) -> PathBuf {
    let digits = total.max(1).to_string().len();
    with_stem_suffix(composite, &format!("{:0digits$}", index + 1))
}

/// Write every frame at full decoded resolution next to `composite`.
///
/// Existing files are handled by `policy` the same way as the composite;
/// skipped frames are left out of the returned paths.
///
/// # Errors
///
/// Stops at the first frame that cannot be written.
pub fn save_single_images(
    frames: &[Frame],
    composite: &Path,
    policy: OverwritePolicy,
) -> Result<Vec<PathBuf>, SheetError> {
    let mut written = Vec::with_capacity(frames.len());
    for (index, frame) in frames.iter().enumerate() {
        let planned = single_image_path(composite, index, frames.len());
        let Some(path) = resolve_collision(&planned, policy) else {
            log::info!("Keeping existing {}", planned.display());
            continue;
        };
        save_image(&frame.image.to_rgba8(), &path)?;
        log::debug!("Wrote frame {} to {}", index + 1, path.display());
        written.push(path);
    }
    Ok(written)
}

/// The cue sheet belonging to `composite`: same name, `.vtt` extension.
pub fn cue_sheet_path(composite: &Path) -> PathBuf {
    composite.with_extension("vtt")
}

/// File name used to reference `composite` from its cue sheet.
pub fn image_reference(composite: &Path) -> String {
    composite
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Load a watermark image.
///
/// # Errors
///
/// Returns [`SheetError::ImageError`] or [`SheetError::IoError`] if the file
/// cannot be read or decoded.
pub fn load_watermark(path: &Path) -> Result<RgbaImage, SheetError> {
    Ok(image::open(path)?.to_rgba8())
}
