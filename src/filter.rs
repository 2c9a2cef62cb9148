//! Cosmetic thumbnail filters.
//!
//! Filters run on each resized thumbnail before labels are drawn. They are
//! parsed from a comma-separated list (`"sepia,strip"`) and applied in
//! order. [`Filter::Fancy`] is the only randomised one; its randomness comes
//! from the `Rng` handed to [`Filter::apply`].

use std::{f32::consts::PI, str::FromStr};

use image::{Rgba, RgbaImage, imageops};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_hollow_rect_mut},
    geometric_transformations::{Interpolation, rotate_about_center},
    rect::Rect,
};
use rand::Rng;

use crate::error::SheetError;

/// Largest rotation applied by [`Filter::Fancy`], in degrees.
pub const FANCY_MAX_ANGLE: f32 = 10.0;

/// A per-thumbnail image filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Luminance only.
    Greyscale,
    /// Warm brown tint.
    Sepia,
    /// Photographic negative.
    Invert,
    /// Cross-processing look: punchy reds, yellowed shadows.
    Cross,
    /// Film strip edges with sprocket holes.
    Strip,
    /// White photo frame tilted by a random angle.
    Fancy,
}

impl FromStr for Filter {
    type Err = SheetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "greyscale" | "grayscale" | "grey" | "gray" => Ok(Filter::Greyscale),
            "sepia" => Ok(Filter::Sepia),
            "invert" => Ok(Filter::Invert),
            "cross" => Ok(Filter::Cross),
            "strip" => Ok(Filter::Strip),
            "fancy" => Ok(Filter::Fancy),
            other => Err(SheetError::Config(format!("unknown filter: {other}"))),
        }
    }
}

/// Parse a comma-separated filter list. `""` and `"none"` mean no filters.
///
/// # Errors
///
/// Returns [`SheetError::Config`] for unknown names.
pub fn parse_filters(list: &str) -> Result<Vec<Filter>, SheetError> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case("none"))
        .map(Filter::from_str)
        .collect()
}

impl Filter {
    /// Apply the filter, returning an image of the same dimensions.
    pub fn apply<R: Rng>(self, mut image: RgbaImage, rng: &mut R) -> RgbaImage {
        match self {
            Filter::Greyscale => {
                map_rgb(&mut image, |r, g, b| {
                    let luma = 0.299 * r + 0.587 * g + 0.114 * b;
                    (luma, luma, luma)
                });
                image
            }
            Filter::Sepia => {
                map_rgb(&mut image, |r, g, b| {
                    (
                        0.393 * r + 0.769 * g + 0.189 * b,
                        0.349 * r + 0.686 * g + 0.168 * b,
                        0.272 * r + 0.534 * g + 0.131 * b,
                    )
                });
                image
            }
            Filter::Invert => {
                imageops::invert(&mut image);
                image
            }
            Filter::Cross => {
                map_rgb(&mut image, |r, g, b| {
                    (contrast(r, 1.3), contrast(g, 1.1), b * 0.7 + 40.0)
                });
                image
            }
            Filter::Strip => {
                draw_film_strip(&mut image);
                image
            }
            Filter::Fancy => {
                let (width, height) = image.dimensions();
                let frame = (width.max(height) / 40).max(2);
                for inset in 0..frame.min(width / 2).min(height / 2) {
                    let rect = Rect::at(inset as i32, inset as i32)
                        .of_size(width - 2 * inset, height - 2 * inset);
                    draw_hollow_rect_mut(&mut image, rect, Rgba([255, 255, 255, 255]));
                }
                let degrees = rng.gen_range(-FANCY_MAX_ANGLE..=FANCY_MAX_ANGLE);
                rotate_about_center(
                    &image,
                    degrees * PI / 180.0,
                    Interpolation::Bilinear,
                    Rgba([0, 0, 0, 0]),
                )
            }
        }
    }
}

/// Apply `f` to every pixel's colour channels, leaving alpha alone.
fn map_rgb(image: &mut RgbaImage, f: impl Fn(f32, f32, f32) -> (f32, f32, f32)) {
    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let (r, g, b) = f(r as f32, g as f32, b as f32);
        *pixel = Rgba([clamp_channel(r), clamp_channel(g), clamp_channel(b), a]);
    }
}

fn contrast(value: f32, factor: f32) -> f32 {
    (value - 128.0) * factor + 128.0
}

fn clamp_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Black bands on the left and right edge punched with light holes.
fn draw_film_strip(image: &mut RgbaImage) {
    let (width, height) = image.dimensions();
    let band = (width / 12).max(4);
    if band * 2 >= width {
        return;
    }

    let black = Rgba([16, 16, 16, 255]);
    let hole = Rgba([235, 235, 235, 255]);
    draw_filled_rect_mut(image, Rect::at(0, 0).of_size(band, height), black);
    draw_filled_rect_mut(
        image,
        Rect::at((width - band) as i32, 0).of_size(band, height),
        black,
    );

    let hole_width = (band / 2).max(1);
    let hole_height = (band * 2 / 3).max(1);
    let pitch = hole_height * 2;
    let inset = ((band - hole_width) / 2) as i32;
    for y in (hole_height / 2..height.saturating_sub(hole_height)).step_by(pitch as usize) {
        for x in [inset, (width - band) as i32 + inset] {
            draw_filled_rect_mut(
                image,
                Rect::at(x, y as i32).of_size(hole_width, hole_height),
                hole,
            );
        }
    }
}
