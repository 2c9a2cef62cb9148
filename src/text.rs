//! Text rendering.
//!
//! Thin wrapper over `ab_glyph` fonts and `imageproc`'s text drawing. Labels
//! are decoration: when no font can be loaded, callers log a warning and
//! leave the text out instead of failing the run (see
//! [`TextRenderer::load_or_warn`]).

use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

use crate::error::SheetError;

/// Environment variable naming a font file to use when none is configured.
pub const FONT_ENV_VAR: &str = "VIDSHEET_FONT";

/// Well-known locations of a sans-serif TrueType font.
pub const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/droid/DroidSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// A loaded font able to measure and draw text.
#[derive(Clone)]
pub struct TextRenderer {
    font: FontArc,
    source: String,
}

impl std::fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRenderer")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl TextRenderer {
    /// Parse a TrueType/OpenType font held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::FontLoad`] if the bytes are not a usable font.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, SheetError> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|error| SheetError::FontLoad(error.to_string()))?;
        Ok(Self {
            font,
            source: "<memory>".to_string(),
        })
    }

    /// Read and parse a font file.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::FontLoad`] if the file is unreadable or not a
    /// font.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SheetError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|error| SheetError::FontLoad(format!("{}: {error}", path.display())))?;
        let mut renderer = Self::from_bytes(bytes)
            .map_err(|error| SheetError::FontLoad(format!("{}: {error}", path.display())))?;
        renderer.source = path.display().to_string();
        Ok(renderer)
    }

    /// Load `explicit` if given, otherwise the font named by
    /// [`FONT_ENV_VAR`], otherwise the first of [`FONT_CANDIDATES`] present.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::FontLoad`] if nothing loads.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, SheetError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = std::env::var_os(FONT_ENV_VAR) {
            return Self::from_file(PathBuf::from(path));
        }
        FONT_CANDIDATES
            .iter()
            .map(Path::new)
            .filter(|path| path.is_file())
            .find_map(|path| Self::from_file(path).ok())
            .ok_or_else(|| {
                SheetError::FontLoad(format!(
                    "no font configured and none found in the usual locations; set {FONT_ENV_VAR}"
                ))
            })
    }

    /// Like [`discover`](Self::discover) but turns failure into a warning.
    pub fn load_or_warn(explicit: Option<&Path>) -> Option<Self> {
        match Self::discover(explicit) {
            Ok(renderer) => {
                log::debug!("Using font {}", renderer.source);
                Some(renderer)
            }
            Err(error) => {
                log::warn!("{error}; labels and header will be left out");
                None
            }
        }
    }

    /// Where the font was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Distance between consecutive baselines at `size` pixels.
    pub fn line_height(&self, size: f32) -> u32 {
        let scaled = self.font.as_scaled(PxScale::from(size));
        (scaled.height() + scaled.line_gap()).ceil().max(1.0) as u32
    }

    /// Rendered `(width, height)` of `text` at `size` pixels.
    pub fn measure(&self, size: f32, text: &str) -> (u32, u32) {
        text_size(PxScale::from(size), &self.font, text)
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn draw(&self, canvas: &mut RgbaImage, x: i32, y: i32, size: f32, color: Rgba<u8>, text: &str) {
        draw_text_mut(canvas, color, x, y, PxScale::from(size), &self.font, text);
    }
}
