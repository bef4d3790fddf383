use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use crate::{render::Framebuffer, Result, VjError};

/// Largest integer upscaling accepted for written frames.
pub const MAX_SCALE: u32 = 16;

/// Configuration options for the recording subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSettings {
    pub output_dir: PathBuf,
    /// Only every n-th frame is written.
    pub every_n_frames: u32,
    /// Integer upscaling applied to each written frame, `1..=MAX_SCALE`.
    pub scale: u32,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("frames"),
            every_n_frames: 1,
            scale: 1,
        }
    }
}

impl RecordingSettings {
    pub fn validate(&self) -> Result<()> {
        check_scale(self.scale)?;
        if self.every_n_frames == 0 {
            return Err(VjError::InvalidConfig(
                "recording stride must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Writes rendered framebuffers to disk as PNG images.
#[derive(Debug, Default)]
pub struct Recorder {
    settings: RecordingSettings,
    is_recording: bool,
    written: usize,
}

impl Recorder {
    pub fn new(settings: RecordingSettings) -> Self {
        Self {
            settings,
            is_recording: false,
            written: 0,
        }
    }

    pub fn settings(&self) -> &RecordingSettings {
        &self.settings
    }

    /// Validates the settings, creates the output directory and begins
    /// accepting frames.
    pub fn start(&mut self) -> Result<()> {
        self.settings.validate()?;
        std::fs::create_dir_all(&self.settings.output_dir)?;
        self.is_recording = true;
        tracing::info!(dir = %self.settings.output_dir.display(), "recording started");
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        if self.is_recording {
            tracing::info!(frames = self.written, "recording stopped");
        }
        self.is_recording = false;
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    /// Number of images written so far.
    pub fn frames_written(&self) -> usize {
        self.written
    }

    /// Writes `frame` if recording is active and `index` falls on the
    /// configured stride. Returns the path written, if any.
    pub fn capture(&mut self, index: u64, frame: &Framebuffer) -> Result<Option<PathBuf>> {
        if !self.is_recording || index % u64::from(self.settings.every_n_frames.max(1)) != 0 {
            return Ok(None);
        }

        let path = self
            .settings
            .output_dir
            .join(format!("frame_{index:05}.png"));
        write_png(&path, frame, self.settings.scale)?;
        self.written += 1;
        tracing::trace!(path = %path.display(), "frame written");
        Ok(Some(path))
    }
}

/// Saves a framebuffer as a PNG, upscaled by `scale` with nearest-neighbour
/// sampling so pixels stay crisp.
pub fn write_png(path: &Path, frame: &Framebuffer, scale: u32) -> Result<()> {
    check_scale(scale)?;
    let (width, height) = match (
        frame.width().checked_mul(scale),
        frame.height().checked_mul(scale),
    ) {
        (Some(width), Some(height)) => (width, height),
        _ => {
            return Err(VjError::InvalidConfig(format!(
                "scaling a {}x{} frame by {scale} overflows",
                frame.width(),
                frame.height()
            )))
        }
    };

    let image = frame.to_image();
    if scale == 1 {
        image.save(path)?;
    } else {
        imageops::resize(&image, width, height, FilterType::Nearest).save(path)?;
    }
    Ok(())
}

fn check_scale(scale: u32) -> Result<()> {
    if (1..=MAX_SCALE).contains(&scale) {
        Ok(())
    } else {
        Err(VjError::InvalidConfig(format!(
            "recording scale must lie in 1..={MAX_SCALE}, got {scale}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{palette, render::Canvas};
    use tempfile::tempdir;

    #[test]
    fn ignores_frames_while_stopped() {
        let dir = tempdir().unwrap();
        let mut recorder = Recorder::new(RecordingSettings {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        });
        let frame = Framebuffer::new(4, 4);
        assert!(recorder.capture(0, &frame).unwrap().is_none());
        assert!(!recorder.is_recording());
    }

    #[test]
    fn writes_strided_png_frames() {
        let dir = tempdir().unwrap();
        let mut recorder = Recorder::new(RecordingSettings {
            output_dir: dir.path().join("frames"),
            every_n_frames: 2,
            scale: 2,
        });
        recorder.start().unwrap();

        let mut frame = Framebuffer::new(3, 2);
        frame.point(0.0, 0.0, 7);
        let mut written = Vec::new();
        for index in 0..5 {
            if let Some(path) = recorder.capture(index, &frame).unwrap() {
                written.push(path);
            }
        }
        recorder.stop().unwrap();

        assert_eq!(written.len(), 3);
        assert_eq!(recorder.frames_written(), 3);
        assert!(written[0].ends_with("frame_00000.png"));

        let image = image::open(&written[0]).unwrap().to_rgb8();
        assert_eq!(image.dimensions(), (6, 4));
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(image.get_pixel(x, y).0, palette::PALETTE[7]);
        }
        assert_eq!(image.get_pixel(2, 0).0, palette::PALETTE[0]);
    }

    #[test]
    fn rejects_oversized_scale_without_panicking() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("huge.png");
        let frame = Framebuffer::new(160, 120);

        for scale in [0, MAX_SCALE + 1, 30_000_000, u32::MAX] {
            let err = write_png(&path, &frame, scale).unwrap_err();
            assert!(matches!(err, VjError::InvalidConfig(_)), "scale {scale}");
        }
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_paths_surface_image_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("frame.png");
        let err = write_png(&path, &Framebuffer::new(4, 4), 1).unwrap_err();
        assert!(matches!(err, VjError::Image(_)), "{err:?}");
    }

    #[test]
    fn start_refuses_invalid_settings() {
        let dir = tempdir().unwrap();
        let mut recorder = Recorder::new(RecordingSettings {
            output_dir: dir.path().to_path_buf(),
            every_n_frames: 1,
            scale: 30_000_000,
        });
        assert!(recorder.start().is_err());
        assert!(!recorder.is_recording());
    }
}
