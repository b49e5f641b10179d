// This is free and unencumbered software released into the public domain.

//! Static camera metadata, decoded from the platform's raw values.

use crate::shared::DEPTH16_FORMAT;
use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LensFacing {
    Front,
    Back,
    External,
}

impl LensFacing {
    /// Decodes a raw `LENS_FACING` value.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Front),
            1 => Some(Self::Back),
            2 => Some(Self::External),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "FRONT",
            Self::Back => "BACK",
            Self::External => "EXTERNAL",
        }
    }

    /// Label for an optional facing, as printed in enumeration logs.
    pub fn label(facing: Option<Self>) -> &'static str {
        facing.map(|f| f.as_str()).unwrap_or("UNKNOWN")
    }
}

impl fmt::Display for LensFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    DepthOutput,
    Other(i32),
}

impl Capability {
    const DEPTH_OUTPUT: i32 = 8;

    pub fn from_raw(raw: i32) -> Self {
        match raw {
            Self::DEPTH_OUTPUT => Self::DepthOutput,
            other => Self::Other(other),
        }
    }
}

/// One entry of the depth stream configuration table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamConfiguration {
    pub format: i32,
    pub width: u32,
    pub height: u32,
    pub input: bool,
}

impl StreamConfiguration {
    /// Decodes `(format, width, height, is_input)` quadruples. A trailing
    /// partial entry is ignored.
    pub fn parse_all(raw: &[i32]) -> Vec<Self> {
        raw.chunks_exact(4)
            .map(|c| Self {
                format: c[0],
                width: c[1].max(0) as u32,
                height: c[2].max(0) as u32,
                input: c[3] != 0,
            })
            .collect()
    }

    pub fn is_depth16_output(&self) -> bool {
        self.format == DEPTH16_FORMAT && !self.input
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraCharacteristics {
    pub id: String,
    pub lens_facing: Option<LensFacing>,
    pub capabilities: Vec<Capability>,
    /// Physical sensor size in millimeters, `(width, height)`.
    pub sensor_physical_size: Option<(f32, f32)>,
    pub focal_lengths: Vec<f32>,
    pub depth_stream_configurations: Vec<StreamConfiguration>,
}

impl CameraCharacteristics {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn is_depth_capable(&self) -> bool {
        self.capabilities.contains(&Capability::DepthOutput)
    }

    pub fn is_front_facing(&self) -> bool {
        self.lens_facing == Some(LensFacing::Front)
    }

    pub fn facing_label(&self) -> &'static str {
        LensFacing::label(self.lens_facing)
    }

    /// Horizontal field of view in radians, from the sensor width and the
    /// first focal length.
    ///
    /// The reported sensor is much wider than the depth capture size, so this
    /// is only good for logging.
    pub fn field_of_view(&self) -> Option<f64> {
        let (sensor_width, _) = self.sensor_physical_size?;
        let focal_length = *self.focal_lengths.first()?;
        if focal_length <= 0.0 {
            return None;
        }
        Some(2.0 * (sensor_width as f64 / (2.0 * focal_length as f64)).atan())
    }

    pub fn depth16_sizes(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.depth_stream_configurations
            .iter()
            .filter(|c| c.is_depth16_output())
            .map(|c| (c.width, c.height))
    }

    pub fn supports_depth16_size(&self, width: u32, height: u32) -> bool {
        self.depth16_sizes().any(|s| s == (width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lens_facing_from_raw() {
        assert_eq!(LensFacing::from_raw(0), Some(LensFacing::Front));
        assert_eq!(LensFacing::from_raw(1), Some(LensFacing::Back));
        assert_eq!(LensFacing::from_raw(2), Some(LensFacing::External));
        assert_eq!(LensFacing::from_raw(7), None);
        assert_eq!(LensFacing::label(None), "UNKNOWN");
        assert_eq!(LensFacing::Front.to_string(), "FRONT");
    }

    #[test]
    fn depth_capability() {
        let mut chars = CameraCharacteristics::new("1");
        chars.capabilities = vec![Capability::from_raw(0), Capability::from_raw(1)];
        assert!(!chars.is_depth_capable());

        chars.capabilities.push(Capability::from_raw(8));
        assert!(chars.is_depth_capable());
    }

    #[test]
    fn missing_capabilities_are_not_depth() {
        assert!(!CameraCharacteristics::new("0").is_depth_capable());
    }

    #[test]
    fn field_of_view_uses_first_focal_length() {
        let mut chars = CameraCharacteristics::new("4");
        chars.sensor_physical_size = Some((4.0, 3.0));
        chars.focal_lengths = vec![2.0, 5.0];
        let fov = chars.field_of_view().unwrap();
        assert!((fov - core::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn field_of_view_needs_size_and_focal_length() {
        let mut chars = CameraCharacteristics::new("4");
        chars.focal_lengths = vec![2.0];
        assert_eq!(chars.field_of_view(), None);

        chars.sensor_physical_size = Some((4.0, 3.0));
        chars.focal_lengths.clear();
        assert_eq!(chars.field_of_view(), None);

        chars.focal_lengths = vec![0.0];
        assert_eq!(chars.field_of_view(), None);
    }

    #[test]
    fn parses_stream_configurations() {
        let raw = [
            DEPTH16_FORMAT, 240, 180, 0, //
            DEPTH16_FORMAT, 320, 240, 1, //
            0x20, 640, 480, 0, //
            DEPTH16_FORMAT, 99,
        ];
        let configs = StreamConfiguration::parse_all(&raw);
        assert_eq!(configs.len(), 3);

        let mut chars = CameraCharacteristics::new("4");
        chars.depth_stream_configurations = configs;
        assert_eq!(chars.depth16_sizes().collect::<Vec<_>>(), vec![(240, 180)]);
        assert!(chars.supports_depth16_size(240, 180));
        assert!(!chars.supports_depth16_size(320, 240));
        assert!(!chars.supports_depth16_size(640, 480));
    }
}
