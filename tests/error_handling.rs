//! Error handling integration tests.
//!
//! These tests verify that meaningful errors are returned for various
//! failure conditions.

use std::error::Error;
use std::time::Duration;

use vidsheet::{FfmpegDecoder, SheetError};

#[test]
fn open_nonexistent_file() {
    let result = FfmpegDecoder::open("this_file_does_not_exist.mp4");
    let error = result.unwrap_err();
    assert!(error.is_input_error());

    let error_message = error.to_string();
    assert!(
        error_message.contains("Failed to open video file"),
        "Error message should mention file open failure: {error_message}",
    );
    assert!(error_message.contains("this_file_does_not_exist.mp4"));
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a video file")
        .expect("Failed to write invalid file");

    let result = FfmpegDecoder::open(&invalid_file_path);
    assert!(matches!(result, Err(SheetError::FileOpen { .. })));
}

#[test]
fn messages_carry_context() {
    let error = SheetError::NoValidFrames { attempted: 4 };
    assert_eq!(
        error.to_string(),
        "No valid frames could be extracted from 4 timestamp(s)"
    );
    assert!(!error.is_input_error());

    let error = SheetError::InvalidRange {
        start: "00:01:00".to_string(),
        end: "00:00:30".to_string(),
    };
    assert!(error.to_string().contains("00:01:00"));
    assert!(error.is_input_error());

    assert!(SheetError::InvalidTimestamp(Duration::from_secs(5)).is_input_error());
    assert!(!SheetError::NoFrames.is_input_error());
}

#[test]
fn io_errors_keep_their_source() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
    let error = SheetError::from(io);
    assert!(matches!(error, SheetError::IoError(_)));
    assert!(error.to_string().contains("read-only"));
    assert!(error.source().is_some());
}

#[test]
fn ffmpeg_errors_convert() {
    let error = SheetError::from(ffmpeg_next::Error::Eof);
    assert!(matches!(error, SheetError::FfmpegError(_)));
}
