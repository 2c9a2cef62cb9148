//! Thumbnail filter tests.

use image::{Rgba, RgbaImage};
use rand::{SeedableRng, rngs::StdRng};
use vidsheet::filter::parse_filters;
use vidsheet::{Filter, SheetError};

fn sample() -> RgbaImage {
    RgbaImage::from_fn(60, 40, |x, y| Rgba([(x * 4) as u8, (y * 6) as u8, 90, 255]))
}

#[test]
fn parse_filter_list() {
    assert_eq!(
        parse_filters("sepia, Strip,fancy").unwrap(),
        vec![Filter::Sepia, Filter::Strip, Filter::Fancy]
    );
    assert_eq!(
        parse_filters("grayscale,invert,cross").unwrap(),
        vec![Filter::Greyscale, Filter::Invert, Filter::Cross]
    );
    assert!(parse_filters("").unwrap().is_empty());
    assert!(parse_filters("none").unwrap().is_empty());
}

#[test]
fn unknown_filter_is_config_error() {
    assert!(matches!(
        parse_filters("sepia,vaporwave"),
        Err(SheetError::Config(_))
    ));
}

#[test]
fn filters_keep_dimensions() {
    let mut rng = StdRng::seed_from_u64(3);
    for filter in [
        Filter::Greyscale,
        Filter::Sepia,
        Filter::Invert,
        Filter::Cross,
        Filter::Strip,
        Filter::Fancy,
    ] {
        let output = filter.apply(sample(), &mut rng);
        assert_eq!(output.dimensions(), (60, 40), "{filter:?}");
    }
}

#[test]
fn greyscale_equalises_channels() {
    let output = Filter::Greyscale.apply(sample(), &mut StdRng::seed_from_u64(0));
    assert!(output.pixels().all(|pixel| pixel[0] == pixel[1] && pixel[1] == pixel[2]));
}

#[test]
fn invert_twice_is_identity() {
    let mut rng = StdRng::seed_from_u64(0);
    let once = Filter::Invert.apply(sample(), &mut rng);
    assert_eq!(once.get_pixel(0, 0), &Rgba([255, 255, 165, 255]));
    assert_eq!(Filter::Invert.apply(once, &mut rng), sample());
}

#[test]
fn strip_darkens_edges() {
    let output = Filter::Strip.apply(sample(), &mut StdRng::seed_from_u64(0));
    // Band is max(60 / 12, 4) = 5 pixels; its top row sits between holes.
    assert_eq!(output.get_pixel(0, 0), &Rgba([16, 16, 16, 255]));
    assert_eq!(output.get_pixel(59, 0), &Rgba([16, 16, 16, 255]));
    assert_eq!(output.get_pixel(30, 20), sample().get_pixel(30, 20));
}

#[test]
fn fancy_is_reproducible_with_seed() {
    let first = Filter::Fancy.apply(sample(), &mut StdRng::seed_from_u64(11));
    let second = Filter::Fancy.apply(sample(), &mut StdRng::seed_from_u64(11));
    assert_eq!(first, second);
}
