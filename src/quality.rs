//! Frame quality heuristics.
//!
//! Three independent predicates decide whether a decoded frame is worth
//! putting on a sheet:
//!
//! - [`is_blank`]: near-uniform pictures (fades, title cards on black).
//! - [`is_blurry`]: pictures with little high-frequency detail.
//! - [`is_unsafe`]: an experimental skin-tone heuristic.
//!
//! [`QualityGate`] combines the enabled predicates; any failing predicate
//! rejects the frame. Rejection is routine control flow, not an error.

use image::{DynamicImage, GrayImage};

/// Default threshold for [`is_blank`].
pub const DEFAULT_BLANK_THRESHOLD: u8 = 85;

/// Default threshold for [`is_blurry`].
pub const DEFAULT_BLUR_THRESHOLD: u8 = 62;

/// Fraction of skin-tone pixels above which a frame is flagged unsafe.
pub const SKIN_FRACTION_LIMIT: f64 = 0.4;

/// Which checks run and how strict they are. Thresholds use a 0–100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityGate {
    /// Reject near-uniform frames.
    pub skip_blank: bool,
    /// Strictness of the blank check.
    pub blank_threshold: u8,
    /// Reject blurry frames.
    pub skip_blurry: bool,
    /// Strictness of the blur check.
    pub blur_threshold: u8,
    /// Reject frames dominated by skin tones.
    pub safe_content: bool,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self {
            skip_blank: false,
            blank_threshold: DEFAULT_BLANK_THRESHOLD,
            skip_blurry: false,
            blur_threshold: DEFAULT_BLUR_THRESHOLD,
            safe_content: false,
        }
    }
}

/// Why a frame was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Luminance barely varies across the frame.
    Blank,
    /// Laplacian response variance is too low.
    Blurry,
    /// Too many pixels look like skin.
    Unsafe,
}

/// Outcome of [`QualityGate::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Every enabled check passed.
    Accept,
    /// The first enabled check that failed.
    Reject(Rejection),
}

impl Verdict {
    /// `true` for [`Verdict::Accept`].
    pub fn is_accepted(self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

impl QualityGate {
    /// A gate with every check disabled.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// `true` if any check is enabled.
    pub fn is_active(&self) -> bool {
        self.skip_blank || self.skip_blurry || self.safe_content
    }

    /// Run the enabled checks in order blank, blur, safe-content.
    pub fn evaluate(&self, image: &DynamicImage) -> Verdict {
        if self.skip_blank && is_blank(image, self.blank_threshold) {
            return Verdict::Reject(Rejection::Blank);
        }
        if self.skip_blurry && is_blurry(image, self.blur_threshold) {
            return Verdict::Reject(Rejection::Blurry);
        }
        if self.safe_content && is_unsafe(image) {
            return Verdict::Reject(Rejection::Unsafe);
        }
        Verdict::Accept
    }
}

/// Mean and population standard deviation of perceptual luminance
/// (`0.299 R + 0.587 G + 0.114 B`).
pub fn luminance_stats(image: &DynamicImage) -> (f64, f64) {
    let rgb = image.to_rgb8();
    let count = (rgb.width() as u64 * rgb.height() as u64) as f64;
    if count == 0.0 {
        return (0.0, 0.0);
    }

    let (sum, sum_of_squares) = rgb.pixels().fold((0.0, 0.0), |(sum, squares), pixel| {
        let [r, g, b] = pixel.0;
        let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
        (sum + luminance, squares + luminance * luminance)
    });

    let mean = sum / count;
    let variance = (sum_of_squares / count - mean * mean).max(0.0);
    (mean, variance.sqrt())
}

/// A frame is blank when its luminance standard deviation falls below
/// `255 * (100 - threshold) / 100`.
pub fn is_blank(image: &DynamicImage, threshold: u8) -> bool {
    let (_, deviation) = luminance_stats(image);
    let limit = 255.0 * (100.0 - threshold.min(100) as f64) / 100.0;
    deviation < limit
}

/// Variance of the absolute 3×3 Laplacian response over interior pixels.
///
/// The kernel weighs the centre +8 and each of the eight neighbours −1.
/// Images smaller than 3×3 have no interior and report 0.
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (width, height) = gray.dimensions();
    if width < 3 || height < 3 {
        return 0.0;
    }

    let mut responses = Vec::with_capacity(((width - 2) * (height - 2)) as usize);
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut neighbours = 0i32;
            for dy in 0..3 {
                for dx in 0..3 {
                    if dx != 1 || dy != 1 {
                        neighbours += gray.get_pixel(x + dx - 1, y + dy - 1).0[0] as i32;
                    }
                }
            }
            let centre = gray.get_pixel(x, y).0[0] as i32;
            responses.push((8 * centre - neighbours).abs() as f64);
        }
    }

    let count = responses.len() as f64;
    let mean = responses.iter().sum::<f64>() / count;
    responses
        .iter()
        .map(|response| (response - mean).powi(2))
        .sum::<f64>()
        / count
}

/// A frame is blurry when its Laplacian variance falls below
/// `threshold * 2`.
pub fn is_blurry(image: &DynamicImage, threshold: u8) -> bool {
    laplacian_variance(&image.to_luma8()) < threshold as f64 * 2.0
}

/// Skin-tone rule on a single RGB pixel.
pub fn is_skin_tone(r: u8, g: u8, b: u8) -> bool {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    r > 95 && g > 40 && b > 20 && r > g && r > b && (r - g).abs() > 15 && r - g.min(b) > 15
}

/// Share of pixels matching [`is_skin_tone`], between 0 and 1.
pub fn skin_fraction(image: &DynamicImage) -> f64 {
    let rgb = image.to_rgb8();
    let total = rgb.pixels().len();
    if total == 0 {
        return 0.0;
    }
    let skin = rgb
        .pixels()
        .filter(|pixel| {
            let [r, g, b] = pixel.0;
            is_skin_tone(r, g, b)
        })
        .count();
    skin as f64 / total as f64
}

/// A frame is unsafe when more than [`SKIN_FRACTION_LIMIT`] of its pixels
/// look like skin.
pub fn is_unsafe(image: &DynamicImage) -> bool {
    skin_fraction(image) > SKIN_FRACTION_LIMIT
}
