//! WebVTT cue sheet tests.

use std::time::Duration;

use vidsheet::cue_sheet::{render_cue_sheet, write_cue_sheet};
use vidsheet::timestamp::display_plan;
use vidsheet::{CompositeLayout, ThumbnailRect};

#[test]
fn renders_one_cue_per_thumbnail() {
    let layout = CompositeLayout::new(3, 2, 100, 50, 10, 40).unwrap();
    let display = display_plan(Duration::from_secs(90), 3);
    let vtt = render_cue_sheet("clip.jpg", &display, &layout.thumbnail_rects());

    let expected = "WEBVTT\n\n\
        00:00:00.000 --> 00:00:30.000\nclip.jpg#xywh=10,50,100,50\n\n\
        00:00:30.000 --> 00:01:00.000\nclip.jpg#xywh=120,50,100,50\n\n\
        00:01:00.000 --> 00:01:30.000\nclip.jpg#xywh=10,110,100,50\n\n";
    assert_eq!(vtt, expected);
}

#[test]
fn cues_use_compositor_rects() {
    let layout = CompositeLayout::new(5, 3, 64, 36, 7, 33).unwrap();
    let rects = layout.thumbnail_rects();
    let vtt = render_cue_sheet("s.png", &display_plan(Duration::from_secs(50), 5), &rects);

    for rect in rects {
        let fragment = format!("s.png#xywh={},{},{},{}", rect.x, rect.y, rect.width, rect.height);
        assert!(vtt.contains(&fragment), "missing {fragment}");
    }
    assert_eq!(vtt.matches(" --> ").count(), 5);
}

#[test]
fn empty_sheet_has_only_header() {
    assert_eq!(render_cue_sheet("x.jpg", &[Duration::ZERO], &[]), "WEBVTT\n\n");
}

#[test]
fn writes_file() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("clip.vtt");
    let rects = [ThumbnailRect {
        x: 1,
        y: 2,
        width: 3,
        height: 4,
    }];
    write_cue_sheet(
        &path,
        "clip.jpg",
        &[Duration::ZERO, Duration::from_millis(1500)],
        &rects,
    )
    .unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("WEBVTT\n\n"));
    assert!(contents.contains("00:00:00.000 --> 00:00:01.500\nclip.jpg#xywh=1,2,3,4\n"));
}
