//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::{collections::VecDeque, time::Duration};

use image::{DynamicImage, Rgb, RgbImage};
use rand::{Rng, SeedableRng, rngs::StdRng};
use vidsheet::{Frame, FrameDecoder, SeekMode, SheetError, VideoMetadata};

pub fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

/// DejaVu Sans Mono, bundled so text rendering is tested everywhere.
pub fn test_font() -> vidsheet::TextRenderer {
    vidsheet::TextRenderer::from_file("tests/fixtures/fonts/DejaVuSansMono.ttf")
        .expect("bundled test font")
}

/// A flat frame, rejected by the blank and blur checks.
pub fn flat_image(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value, value, value])))
}

/// Random noise, accepted by the blank and blur checks.
pub fn noise_image(width: u32, height: u32, seed: u64) -> DynamicImage {
    let mut rng = StdRng::seed_from_u64(seed);
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |_, _| {
        Rgb([rng.gen_range(0..=255), rng.gen_range(0..=255), rng.gen_range(0..=255)])
    }))
}

pub fn frames(count: usize, width: u32, height: u32) -> Vec<Frame> {
    (0..count)
        .map(|index| {
            Frame::new(
                noise_image(width, height, index as u64),
                Duration::from_secs(index as u64 * 10),
            )
        })
        .collect()
}

/// What a [`ScriptedDecoder`] answers to one call.
#[derive(Debug, Clone)]
pub enum Response {
    Image(DynamicImage),
    EndOfStream,
    Corrupt,
}

/// Answers calls from a script, then repeats `fallback`. Records every call.
pub struct ScriptedDecoder {
    metadata: VideoMetadata,
    script: VecDeque<Response>,
    fallback: Response,
    pub calls: Vec<(Duration, SeekMode)>,
}

impl ScriptedDecoder {
    pub fn new(duration: Duration, script: Vec<Response>, fallback: Response) -> Self {
        Self {
            metadata: VideoMetadata::synthetic("scripted.mp4", duration, 64, 36),
            script: script.into(),
            fallback,
            calls: Vec::new(),
        }
    }

    /// Always returns a fresh noise frame.
    pub fn sharp(duration: Duration) -> Self {
        Self::new(duration, Vec::new(), Response::Image(noise_image(64, 36, 99)))
    }
}

impl FrameDecoder for ScriptedDecoder {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn seek_and_decode(
        &mut self,
        timestamp: Duration,
        mode: SeekMode,
    ) -> Result<Option<Frame>, SheetError> {
        self.calls.push((timestamp, mode));
        let response = self
            .script
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match response {
            Response::Image(image) => {
                let mut frame = Frame::new(image, timestamp);
                frame.decoded_at = Some(timestamp);
                Ok(Some(frame))
            }
            Response::EndOfStream => Ok(None),
            Response::Corrupt => Err(SheetError::VideoDecodeError("corrupt packet".to_string())),
        }
    }
}
