//! End-to-end sheet generation tests.
//!
//! `generate` runs against a scripted decoder; `run` needs the fixture from
//! `tests/fixtures/generate_fixtures.sh` and returns early without it.

mod common;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use common::{Response, ScriptedDecoder, flat_image, noise_image, sample_video_path};
use vidsheet::{NoOpProgress, SheetError, SheetOptions, SheetResources, sheet};

fn quiet_options() -> SheetOptions {
    SheetOptions {
        numcaps: 6,
        columns: 3,
        width: 64,
        header: false,
        timestamps: false,
        ..SheetOptions::default()
    }
}

#[test]
fn generate_composes_all_slots() {
    let mut decoder = ScriptedDecoder::sharp(Duration::from_secs(70));
    let output = sheet::generate(
        &mut decoder,
        &quiet_options(),
        &SheetResources::default(),
        Arc::new(NoOpProgress),
    )
    .unwrap();

    assert_eq!(output.frames.len(), 6);
    assert_eq!(output.rects.len(), 6);
    assert_eq!(output.display.len(), 7);
    assert_eq!(output.display.last(), Some(&Duration::from_secs(70)));
    assert_eq!(output.image.dimensions(), output.layout.canvas_size());

    let seeks: Vec<u64> = decoder
        .calls
        .iter()
        .map(|(timestamp, _)| timestamp.as_secs())
        .collect();
    assert_eq!(seeks, vec![10, 20, 30, 40, 50, 60]);
}

#[test]
fn generate_retries_rejected_frames() {
    let mut decoder = ScriptedDecoder::new(
        Duration::from_secs(70),
        vec![
            Response::Image(flat_image(64, 36, 0)),
            Response::Image(noise_image(64, 36, 1)),
        ],
        Response::Image(noise_image(64, 36, 2)),
    );
    let options = SheetOptions {
        skip_blank: true,
        ..quiet_options()
    };
    let output = sheet::generate(
        &mut decoder,
        &options,
        &SheetResources::default(),
        Arc::new(NoOpProgress),
    )
    .unwrap();

    assert_eq!(output.frames.len(), 6);
    assert_eq!(decoder.calls.len(), 7);
    assert_eq!(decoder.calls[1].0, Duration::from_secs(11));
    assert_eq!(output.frames[0].timestamp, Duration::from_secs(10));
}

#[test]
fn display_plan_follows_accepted_frames() {
    // The second slot never decodes, so only five cues remain.
    let mut script = vec![Response::Image(noise_image(64, 36, 1))];
    script.extend(std::iter::repeat_n(Response::EndOfStream, 3));
    let mut decoder = ScriptedDecoder::new(
        Duration::from_secs(70),
        script,
        Response::Image(noise_image(64, 36, 2)),
    );
    let output = sheet::generate(
        &mut decoder,
        &quiet_options(),
        &SheetResources::default(),
        Arc::new(NoOpProgress),
    )
    .unwrap();

    assert_eq!(output.frames.len(), 5);
    assert_eq!(output.display.len(), 6);
    assert_eq!(output.display[1], Duration::from_secs(14));
}

#[test]
fn generate_fails_without_frames() {
    let mut decoder =
        ScriptedDecoder::new(Duration::from_secs(70), Vec::new(), Response::EndOfStream);
    let result = sheet::generate(
        &mut decoder,
        &quiet_options(),
        &SheetResources::default(),
        Arc::new(NoOpProgress),
    );
    assert!(matches!(
        result,
        Err(SheetError::NoValidFrames { attempted: 6 })
    ));
}

#[test]
fn generate_rejects_invalid_range() {
    let mut decoder = ScriptedDecoder::sharp(Duration::from_secs(70));
    let options = SheetOptions {
        from: "00:05:00".to_string(),
        ..quiet_options()
    };
    let result = sheet::generate(
        &mut decoder,
        &options,
        &SheetResources::default(),
        Arc::new(NoOpProgress),
    );
    assert!(matches!(result, Err(SheetError::InvalidTimestamp(_))));
    assert!(decoder.calls.is_empty());
}

#[test]
fn run_writes_all_outputs() {
    if !Path::new(sample_video_path()).exists() {
        return;
    }
    let directory = tempfile::tempdir().unwrap();
    let options = SheetOptions {
        output: format!("{}/{{{{.Name}}}}.jpg", directory.path().display()),
        single_images: true,
        webvtt: true,
        ..quiet_options()
    };

    let summary = sheet::run(sample_video_path(), &options, Arc::new(NoOpProgress)).unwrap();
    let composite = summary.composite.clone().expect("composite written");
    assert_eq!(composite, directory.path().join("sample_video.jpg"));
    assert!(composite.exists());
    assert_eq!(summary.single_images.len(), summary.frame_count);
    assert!(summary.single_images.iter().all(|path| path.exists()));

    let vtt_path = summary.cue_sheet.expect("cue sheet written");
    let vtt = std::fs::read_to_string(vtt_path).unwrap();
    assert!(vtt.starts_with("WEBVTT"));
    assert_eq!(vtt.matches("sample_video.jpg#xywh=").count(), summary.frame_count);

    // A second run with skip_existing leaves the sheet alone.
    let skip = SheetOptions {
        skip_existing: true,
        ..options.clone()
    };
    let skipped = sheet::run(sample_video_path(), &skip, Arc::new(NoOpProgress)).unwrap();
    assert!(skipped.skipped);
    assert!(skipped.composite.is_none());

    // Without a policy the new sheet gets the first free suffix; the single
    // images of the first run already hold `-1` to `-N`.
    let renamed = sheet::run(sample_video_path(), &options, Arc::new(NoOpProgress)).unwrap();
    let expected = format!("sample_video-{}.jpg", summary.frame_count + 1);
    assert_eq!(renamed.composite, Some(directory.path().join(expected)));
}

#[test]
fn run_keeps_leftover_cue_sheet() {
    if !Path::new(sample_video_path()).exists() {
        return;
    }
    let directory = tempfile::tempdir().unwrap();
    let leftover = directory.path().join("sample_video.vtt");
    std::fs::write(&leftover, "WEBVTT\n\nold\n").unwrap();
    let options = SheetOptions {
        output: format!("{}/{{{{.Name}}}}.jpg", directory.path().display()),
        webvtt: true,
        ..quiet_options()
    };

    let summary = sheet::run(sample_video_path(), &options, Arc::new(NoOpProgress)).unwrap();
    assert_eq!(
        summary.composite,
        Some(directory.path().join("sample_video.jpg"))
    );
    assert_eq!(
        summary.cue_sheet,
        Some(directory.path().join("sample_video-1.vtt"))
    );
    assert_eq!(std::fs::read_to_string(&leftover).unwrap(), "WEBVTT\n\nold\n");

    let replace = SheetOptions {
        overwrite: true,
        ..options
    };
    let summary = sheet::run(sample_video_path(), &replace, Arc::new(NoOpProgress)).unwrap();
    assert_eq!(summary.cue_sheet, Some(leftover.clone()));
    assert!(std::fs::read_to_string(&leftover).unwrap().contains("sample_video.jpg#xywh="));
}

#[test]
fn run_reports_missing_input() {
    let directory = tempfile::tempdir().unwrap();
    let options = SheetOptions {
        output: format!("{}/{{{{.Name}}}}.jpg", directory.path().display()),
        ..quiet_options()
    };
    let result = sheet::run(
        directory.path().join("missing.mp4"),
        &options,
        Arc::new(NoOpProgress),
    );
    assert!(matches!(result, Err(SheetError::FileOpen { .. })));
}
