//! Output naming and writing tests.

mod common;

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use vidsheet::OverwritePolicy;
use vidsheet::output::{
    cue_sheet_path, image_reference, resolve_collision, resolve_output_pattern, save_image,
    save_single_images, single_image_path,
};

#[test]
fn pattern_substitution() {
    let input = Path::new("videos").join("holiday.mkv");
    let expected = Path::new("videos").join("holiday.jpg");
    assert_eq!(resolve_output_pattern("{{.Path}}{{.Name}}.jpg", &input), expected);

    assert_eq!(
        resolve_output_pattern("sheets/{{.Name}}-sheet.png", &input),
        PathBuf::from("sheets/holiday-sheet.png")
    );
    assert_eq!(
        resolve_output_pattern("{{.Path}}{{.Name}}.jpg", Path::new("clip.mp4")),
        PathBuf::from("clip.jpg")
    );
}

#[test]
fn policy_from_flags() {
    assert_eq!(OverwritePolicy::from_flags(true, false), OverwritePolicy::Replace);
    assert_eq!(OverwritePolicy::from_flags(false, true), OverwritePolicy::Skip);
    assert_eq!(OverwritePolicy::from_flags(false, false), OverwritePolicy::Rename);
}

#[test]
fn collision_policies() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("clip.jpg");

    // Free paths are used as they are.
    assert_eq!(resolve_collision(&path, OverwritePolicy::Skip), Some(path.clone()));

    std::fs::write(&path, b"x").unwrap();
    assert_eq!(resolve_collision(&path, OverwritePolicy::Replace), Some(path.clone()));
    assert_eq!(resolve_collision(&path, OverwritePolicy::Skip), None);
    assert_eq!(
        resolve_collision(&path, OverwritePolicy::Rename),
        Some(directory.path().join("clip-1.jpg"))
    );

    std::fs::write(directory.path().join("clip-1.jpg"), b"x").unwrap();
    assert_eq!(
        resolve_collision(&path, OverwritePolicy::Rename),
        Some(directory.path().join("clip-2.jpg"))
    );
}

#[test]
fn single_image_names_are_zero_padded() {
    let composite = Path::new("out").join("clip.jpg");
    assert_eq!(
        single_image_path(&composite, 0, 12),
        Path::new("out").join("clip-01.jpg")
    );
    assert_eq!(
        single_image_path(&composite, 11, 12),
        Path::new("out").join("clip-12.jpg")
    );
    assert_eq!(
        single_image_path(&composite, 4, 9),
        Path::new("out").join("clip-5.jpg")
    );
    assert_eq!(
        single_image_path(&composite, 0, 100),
        Path::new("out").join("clip-001.jpg")
    );
}

#[test]
fn cue_sheet_sits_next_to_composite() {
    let composite = Path::new("out").join("clip.jpg");
    assert_eq!(cue_sheet_path(&composite), Path::new("out").join("clip.vtt"));
    assert_eq!(image_reference(&composite), "clip.jpg");
}

#[test]
fn save_creates_directories_and_flattens_jpeg() {
    let directory = tempfile::tempdir().unwrap();
    let image = RgbaImage::from_pixel(20, 10, Rgba([200, 100, 50, 128]));

    let jpeg = directory.path().join("nested").join("sheet.jpg");
    save_image(&image, &jpeg).unwrap();
    let decoded = image::open(&jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (20, 10));
    assert!(!decoded.color().has_alpha());

    let png = directory.path().join("sheet.png");
    save_image(&image, &png).unwrap();
    let decoded = image::open(&png).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(3, 3), &Rgba([200, 100, 50, 128]));
}

#[test]
fn unknown_extension_is_an_error() {
    let directory = tempfile::tempdir().unwrap();
    let image = RgbaImage::new(4, 4);
    assert!(save_image(&image, &directory.path().join("sheet.xyz")).is_err());
}

#[test]
fn single_images_are_written() {
    let directory = tempfile::tempdir().unwrap();
    let composite = directory.path().join("clip.png");
    let frames = common::frames(3, 32, 18);

    let written = save_single_images(&frames, &composite, OverwritePolicy::Rename).unwrap();
    assert_eq!(
        written,
        vec![
            directory.path().join("clip-1.png"),
            directory.path().join("clip-2.png"),
            directory.path().join("clip-3.png"),
        ]
    );
    for path in written {
        let image = image::open(&path).unwrap();
        assert_eq!((image.width(), image.height()), (32, 18));
    }
}

#[test]
fn single_images_respect_existing_files() {
    let directory = tempfile::tempdir().unwrap();
    let composite = directory.path().join("clip.png");
    let leftover = directory.path().join("clip-2.png");
    let frames = common::frames(3, 32, 18);

    std::fs::write(&leftover, b"keep me").unwrap();
    let written = save_single_images(&frames, &composite, OverwritePolicy::Skip).unwrap();
    assert_eq!(written.len(), 2);
    assert!(!written.contains(&leftover));
    assert_eq!(std::fs::read(&leftover).unwrap(), b"keep me");

    let written = save_single_images(&frames, &composite, OverwritePolicy::Rename).unwrap();
    assert_eq!(written[1], directory.path().join("clip-2-1.png"));
    assert_eq!(std::fs::read(&leftover).unwrap(), b"keep me");

    let written = save_single_images(&frames, &composite, OverwritePolicy::Replace).unwrap();
    assert_eq!(written[1], leftover);
    assert!(image::open(&leftover).is_ok());
}
