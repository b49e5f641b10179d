// This is free and unencumbered software released into the public domain.

//! Android NDK camera2 backend.

mod camera_capture_session;
mod camera_device;
mod camera_manager;
mod camera_status;
mod capture_request;
mod image;
mod image_reader;
mod media_status;
mod metadata;
mod native_window;
mod outputs;

pub use camera_capture_session::*;
pub use camera_device::*;
pub use camera_manager::*;
pub use camera_status::*;
pub use capture_request::*;
pub use image::*;
pub use image_reader::*;
pub use media_status::*;
pub use metadata::*;
pub use native_window::*;
pub use outputs::*;

use crate::shared::{
    CameraCharacteristics, CameraError, CameraHost, CaptureRequest, DeviceListener, FrameOutput,
    HostDevice, HostSession, StreamSpec,
};
use alloc::{borrow::Cow, ffi::CString};
use ndk_sys::android_get_device_api_level;
use tracing::debug;

#[link(name = "camera2ndk")]
unsafe extern "C" {}

#[link(name = "mediandk")]
unsafe extern "C" {}

fn camera_id_cstring(id: &str) -> Result<CString, CameraError> {
    CString::new(id)
        .map_err(|_| CameraError::invalid_config(format!("camera id {id:?} contains NUL")))
}

#[derive(Debug)]
pub struct AndroidCameraHost {
    manager: CameraManager,
    pub api_level: u32,
}

// The NDK camera objects may be used from any thread.
unsafe impl Send for AndroidCameraHost {}

impl AndroidCameraHost {
    pub fn new() -> Result<Self, CameraError> {
        let api_level = unsafe { android_get_device_api_level() } as u32;
        debug!(api_level, "android_get_device_api_level");
        Ok(Self {
            manager: CameraManager::new()?,
            api_level,
        })
    }
}

impl dogma::Named for AndroidCameraHost {
    fn name(&self) -> Cow<'_, str> {
        "camera2ndk".into()
    }
}

impl CameraHost for AndroidCameraHost {
    fn camera_ids(&self) -> Result<Vec<String>, CameraError> {
        self.manager
            .get_camera_ids()
            .map_err(|s| s.into_error("listing cameras"))
    }

    fn characteristics(&self, camera_id: &str) -> Result<CameraCharacteristics, CameraError> {
        let id = camera_id_cstring(camera_id)?;
        self.manager
            .get_characteristics(&id)
            .and_then(|metadata| metadata.to_characteristics(camera_id))
            .map_err(|s| s.into_error("reading camera characteristics"))
    }

    fn open_device(
        &mut self,
        camera_id: &str,
        listener: DeviceListener,
    ) -> Result<Box<dyn HostDevice>, CameraError> {
        let id = camera_id_cstring(camera_id)?;
        let device = self
            .manager
            .open_camera(id, listener)
            .map_err(|s| s.into_error("opening camera"))?;
        Ok(Box::new(AndroidDevice { device }))
    }
}

#[derive(Debug)]
pub struct AndroidDevice {
    device: CameraDevice,
}

unsafe impl Send for AndroidDevice {}

impl HostDevice for AndroidDevice {
    fn id(&self) -> &str {
        self.device.id()
    }

    fn create_capture_session(
        &mut self,
        stream: &StreamSpec,
        output: FrameOutput,
    ) -> Result<Box<dyn HostSession>, CameraError> {
        let reader = ImageReader::new(stream, self.device.id(), output)
            .map_err(|s| s.into_error("creating image reader"))?;
        let window =
            NativeWindow::from_reader(&reader).map_err(|s| s.into_error("getting reader window"))?;

        let mut outputs = CaptureSessionOutputContainer::new()
            .map_err(|s| s.into_error("creating session output container"))?;
        let output = CaptureSessionOutput::new(&window)
            .map_err(|s| s.into_error("creating session output"))?;
        outputs
            .add(output)
            .map_err(|s| s.into_error("adding session output"))?;

        let target =
            CameraOutputTarget::new(&window).map_err(|s| s.into_error("creating output target"))?;
        let mut request = NativeCaptureRequest::preview(&self.device)
            .map_err(|s| s.into_error("creating capture request"))?;
        request
            .add_target(&target)
            .map_err(|s| s.into_error("adding request target"))?;

        let session = CameraCaptureSession::open(&self.device, &outputs)
            .map_err(|s| s.into_error("creating capture session"))?;

        Ok(Box::new(AndroidSession {
            session,
            request,
            _target: target,
            _outputs: outputs,
            _window: window,
            _reader: reader,
        }))
    }

    fn close(&mut self) {
        self.device.close();
    }
}

/// Field order is drop order: the session closes before its outputs and
/// the reader they write into are released.
#[derive(Debug)]
pub struct AndroidSession {
    session: CameraCaptureSession,
    request: NativeCaptureRequest,
    _target: CameraOutputTarget,
    _outputs: CaptureSessionOutputContainer,
    _window: NativeWindow,
    _reader: ImageReader,
}

unsafe impl Send for AndroidSession {}

impl HostSession for AndroidSession {
    fn set_repeating_request(&mut self, request: &CaptureRequest) -> Result<(), CameraError> {
        self.request
            .apply(request)
            .map_err(|s| s.into_error("setting capture request entries"))?;
        self.session
            .set_repeating_request(&self.request)
            .map_err(|s| s.into_error("setting repeating request"))
    }

    fn stop_repeating(&mut self) -> Result<(), CameraError> {
        self.session
            .stop_repeating()
            .map_err(|s| s.into_error("stopping repeating request"))
    }

    fn close(&mut self) {
        self.session.close();
    }
}
