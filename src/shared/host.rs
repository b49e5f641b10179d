// This is free and unencumbered software released into the public domain.

//! The seam between the depth camera session and a platform camera API.
//!
//! A host enumerates devices and opens them; a device creates one capture
//! session writing into a DEPTH16 image reader; the session runs one
//! repeating request. Frames flow through the [`FrameOutput`] handed to the
//! device, asynchronous device failures through the [`DeviceListener`].

use crate::shared::{CameraCharacteristics, CameraError, CameraEvent, FpsRange, FrameOutput};
use core::fmt;
use std::sync::mpsc::SyncSender;
use tracing::{error, warn};

pub trait CameraHost: dogma::Named + Send {
    fn camera_ids(&self) -> Result<Vec<String>, CameraError>;

    fn characteristics(&self, camera_id: &str) -> Result<CameraCharacteristics, CameraError>;

    /// Fails with [`CameraError::PermissionDenied`] when the process may not
    /// open cameras. Hosts that can only find out at open time accept here.
    fn check_permission(&self) -> Result<(), CameraError> {
        Ok(())
    }

    fn open_device(
        &mut self,
        camera_id: &str,
        listener: DeviceListener,
    ) -> Result<Box<dyn HostDevice>, CameraError>;
}

pub trait HostDevice: Send {
    fn id(&self) -> &str;

    fn create_capture_session(
        &mut self,
        stream: &StreamSpec,
        output: FrameOutput,
    ) -> Result<Box<dyn HostSession>, CameraError>;

    fn close(&mut self) {}
}

pub trait HostSession: Send {
    fn set_repeating_request(&mut self, request: &CaptureRequest) -> Result<(), CameraError>;

    fn stop_repeating(&mut self) -> Result<(), CameraError>;

    fn close(&mut self) {}
}

/// The image reader a capture session writes into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamSpec {
    pub width: u32,
    pub height: u32,
    pub format: i32,
    pub max_images: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestTemplate {
    #[default]
    Preview,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlMode {
    Off,
    Auto,
}

impl ControlMode {
    pub fn to_raw(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Auto => 1,
        }
    }
}

/// Platform-independent contents of a capture request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureRequest {
    pub template: RequestTemplate,
    pub jpeg_orientation: Option<i32>,
    pub ae_target_fps_range: Option<FpsRange>,
    pub control_mode: Option<ControlMode>,
    pub targets: usize,
}

impl CaptureRequest {
    pub fn new(template: RequestTemplate) -> Self {
        Self {
            template,
            ..Default::default()
        }
    }

    pub fn with_jpeg_orientation(mut self, degrees: i32) -> Self {
        self.jpeg_orientation = Some(degrees);
        self
    }

    pub fn with_ae_target_fps_range(mut self, range: FpsRange) -> Self {
        self.ae_target_fps_range = Some(range);
        self
    }

    pub fn with_control_mode(mut self, mode: ControlMode) -> Self {
        self.control_mode = Some(mode);
        self
    }

    pub fn add_target(&mut self) {
        self.targets += 1;
    }
}

/// Device error codes reported through the device state callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceErrorKind {
    CameraInUse,
    MaxCamerasInUse,
    CameraDisabled,
    CameraDevice,
    CameraService,
    Unknown(i32),
}

impl DeviceErrorKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::CameraInUse,
            2 => Self::MaxCamerasInUse,
            3 => Self::CameraDisabled,
            4 => Self::CameraDevice,
            5 => Self::CameraService,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for DeviceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CameraInUse => f.write_str("camera in use"),
            Self::MaxCamerasInUse => f.write_str("too many cameras in use"),
            Self::CameraDisabled => f.write_str("camera disabled"),
            Self::CameraDevice => f.write_str("fatal camera device error"),
            Self::CameraService => f.write_str("fatal camera service error"),
            Self::Unknown(code) => write!(f, "unknown device error {code}"),
        }
    }
}

/// Receives the device's asynchronous state callbacks.
///
/// Nothing is recovered here: the callbacks are logged and published as
/// [`CameraEvent`]s for whoever owns the session.
#[derive(Clone, Debug)]
pub struct DeviceListener {
    camera_id: String,
    events_tx: SyncSender<CameraEvent>,
}

impl DeviceListener {
    pub fn new(camera_id: impl Into<String>, events_tx: SyncSender<CameraEvent>) -> Self {
        Self {
            camera_id: camera_id.into(),
            events_tx,
        }
    }

    pub fn camera_id(&self) -> &str {
        &self.camera_id
    }

    pub fn on_disconnected(&self) {
        warn!(camera_id = %self.camera_id, "camera device disconnected");
        let _ = self.events_tx.try_send(CameraEvent::Disconnected {
            camera_id: self.camera_id.clone(),
        });
    }

    pub fn on_error(&self, code: i32) {
        let kind = DeviceErrorKind::from_code(code);
        error!(camera_id = %self.camera_id, code, "camera device error: {kind}");
        let _ = self.events_tx.try_send(CameraEvent::DeviceError {
            camera_id: self.camera_id.clone(),
            code,
        });
    }
}
