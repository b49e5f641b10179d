// This is free and unencumbered software released into the public domain.

use crate::shared::{CameraError, LensFacing};

pub const FPS_MIN: u32 = 15;
pub const FPS_MAX: u32 = 30;

/// Size of the DEPTH16 image reader.
pub const DEPTH_WIDTH: u32 = 240;
pub const DEPTH_HEIGHT: u32 = 180;

/// Auto-exposure target frame rate range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FpsRange {
    pub min: u32,
    pub max: u32,
}

impl Default for FpsRange {
    fn default() -> Self {
        Self {
            min: FPS_MIN,
            max: FPS_MAX,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DepthCameraConfig {
    pub device: Option<String>,
    pub facing: LensFacing,
    pub width: u32,
    pub height: u32,
    pub max_images: usize,
    pub fps_range: FpsRange,
    pub jpeg_orientation: i32,
    pub buffer_frames: usize,
    pub vendor_tags: bool,
    pub diagnostics: bool,
}

impl Default for DepthCameraConfig {
    fn default() -> Self {
        Self {
            device: None,
            facing: LensFacing::Front,
            width: DEPTH_WIDTH,
            height: DEPTH_HEIGHT,
            max_images: 2,
            fps_range: FpsRange::default(),
            jpeg_orientation: 0,
            buffer_frames: 2,
            vendor_tags: true,
            diagnostics: false,
        }
    }
}

impl DepthCameraConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn with_facing(mut self, facing: LensFacing) -> Self {
        self.facing = facing;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_max_images(mut self, n: usize) -> Self {
        self.max_images = n.max(1);
        self
    }

    pub fn with_buffer_frames(mut self, n: usize) -> Self {
        self.buffer_frames = n.max(1);
        self
    }

    pub fn with_vendor_tags(mut self, enabled: bool) -> Self {
        self.vendor_tags = enabled;
        self
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), CameraError> {
        if self.width == 0 || self.height == 0 {
            return Err(CameraError::invalid_config(format!(
                "depth size {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        let FpsRange { min, max } = self.fps_range;
        if min == 0 || min > max {
            return Err(CameraError::invalid_config(format!(
                "fps range [{min}, {max}] is empty"
            )));
        }
        if self.max_images == 0 {
            return Err(CameraError::invalid_config("max_images must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_depth_stream() {
        let config = DepthCameraConfig::default();
        assert_eq!((config.width, config.height), (240, 180));
        assert_eq!(config.fps_range, FpsRange { min: 15, max: 30 });
        assert_eq!(config.max_images, 2);
        assert_eq!(config.facing, LensFacing::Front);
        assert_eq!(config.jpeg_orientation, 0);
        assert!(config.device.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builders_clamp_counts() {
        let config = DepthCameraConfig::default()
            .with_max_images(0)
            .with_buffer_frames(0);
        assert_eq!(config.max_images, 1);
        assert_eq!(config.buffer_frames, 1);
    }

    #[test]
    fn rejects_zero_size() {
        let err = DepthCameraConfig::new(0, 180).validate().unwrap_err();
        assert!(matches!(err, CameraError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_inverted_fps_range() {
        let mut config = DepthCameraConfig::default();
        config.fps_range = FpsRange { min: 30, max: 15 };
        assert!(matches!(
            config.validate(),
            Err(CameraError::InvalidConfig(_))
        ));

        config.fps_range = FpsRange { min: 0, max: 15 };
        assert!(config.validate().is_err());
    }
}
