//! Writes the latest frame to a PNG file, for panels without hardware.
//!
//! Each frame is encoded to a sibling temp file and renamed over the target,
//! so a viewer polling the file never reads a half-written image.

use std::path::{Path, PathBuf};

use image::{GrayImage, ImageFormat, Luma};

use super::{check_size, Display, DisplayError};
use crate::render::{Frame, Panel};

/// Output pixels per panel pixel.
const DEFAULT_SCALE: u32 = 8;

/// Luma of a lit pixel at contrast 0; contrast 255 maps to full white.
const MIN_LIT_LUMA: u32 = 64;

pub struct PngSink {
    path: PathBuf,
    panel: Panel,
    scale: u32,
    contrast: u8,
}

impl PngSink {
    /// Fails if the target directory does not exist.
    pub fn create(path: impl Into<PathBuf>, panel: Panel) -> Result<Self, DisplayError> {
        let path = path.into();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        if !dir.is_dir() {
            return Err(DisplayError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("directory {} does not exist", dir.display()),
            )));
        }
        Ok(Self {
            path,
            panel,
            scale: DEFAULT_SCALE,
            contrast: u8::MAX,
        })
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale.max(1);
        self
    }

    fn lit_luma(&self) -> u8 {
        (MIN_LIT_LUMA + u32::from(self.contrast) * (255 - MIN_LIT_LUMA) / 255) as u8
    }

    fn encode(&self, frame: &Frame) -> GrayImage {
        let lit = self.lit_luma();
        let scale = self.scale;
        GrayImage::from_fn(frame.width() * scale, frame.height() * scale, |x, y| {
            let on = frame.get((x / scale) as i32, (y / scale) as i32);
            Luma([if on { lit } else { 0 }])
        })
    }
}

impl Display for PngSink {
    fn panel(&self) -> Panel {
        self.panel
    }

    fn set_contrast(&mut self, level: u8) -> Result<(), DisplayError> {
        self.contrast = level;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.flush(&Frame::new(self.panel))
    }

    fn flush(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        check_size(self.panel, frame)?;
        let image = self.encode(frame);
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        image.save_with_format(&tmp, ImageFormat::Png)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::trace!("Wrote frame to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_scaled_frame() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("panel.png");
        let panel = Panel::new(1, 4, 2);
        let mut sink = PngSink::create(&path, panel).unwrap().with_scale(2);
        sink.canvas(|f| f.set(1, 0, true)).unwrap();

        let img = image::open(&path).unwrap().into_luma8();
        assert_eq!(img.dimensions(), (8, 4));
        assert_eq!(img.get_pixel(2, 0)[0], 255);
        assert_eq!(img.get_pixel(3, 1)[0], 255);
        assert_eq!(img.get_pixel(0, 0)[0], 0);
        assert!(!dir.path().join("panel.png.tmp").exists());
    }

    #[test]
    fn contrast_dims_lit_pixels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("panel.png");
        let mut sink = PngSink::create(&path, Panel::new(1, 1, 1)).unwrap().with_scale(1);
        sink.set_contrast(0).unwrap();
        sink.canvas(|f| f.set(0, 0, true)).unwrap();
        let img = image::open(&path).unwrap().into_luma8();
        assert_eq!(img.get_pixel(0, 0)[0], MIN_LIT_LUMA as u8);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope").join("panel.png");
        assert!(PngSink::create(path, Panel::default()).is_err());
    }
}
