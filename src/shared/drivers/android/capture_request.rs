// This is free and unencumbered software released into the public domain.

use super::{CameraDevice, CameraOutputTarget, CameraResult, CameraStatus};
use crate::shared::CaptureRequest;
use core::ptr::null_mut;
use ndk_sys::{
    ACaptureRequest, ACaptureRequest_addTarget, ACaptureRequest_free,
    ACaptureRequest_setEntry_i32, ACaptureRequest_setEntry_u8, acamera_metadata_tag,
};

/// Native `ACaptureRequest` built from the preview template.
#[derive(Debug)]
pub struct NativeCaptureRequest {
    pub(crate) handle: *mut ACaptureRequest,
}

impl Drop for NativeCaptureRequest {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ACaptureRequest_free(self.handle) }
            self.handle = null_mut();
        }
    }
}

impl NativeCaptureRequest {
    pub fn preview(device: &CameraDevice) -> CameraResult<Self> {
        Ok(Self {
            handle: device.create_preview_request()?,
        })
    }

    pub fn add_target(&mut self, target: &CameraOutputTarget) -> CameraResult {
        CameraStatus::check(unsafe { ACaptureRequest_addTarget(self.handle, target.handle) })
    }

    fn set_i32s(&mut self, tag: acamera_metadata_tag, values: &[i32]) -> CameraResult {
        CameraStatus::check(unsafe {
            ACaptureRequest_setEntry_i32(self.handle, tag.0, values.len() as u32, values.as_ptr())
        })
    }

    fn set_u8(&mut self, tag: acamera_metadata_tag, value: u8) -> CameraResult {
        CameraStatus::check(unsafe { ACaptureRequest_setEntry_u8(self.handle, tag.0, 1, &value) })
    }

    /// Copies the portable request entries into the native request.
    pub fn apply(&mut self, request: &CaptureRequest) -> CameraResult {
        if let Some(degrees) = request.jpeg_orientation {
            self.set_i32s(acamera_metadata_tag::ACAMERA_JPEG_ORIENTATION, &[degrees])?;
        }
        if let Some(range) = request.ae_target_fps_range {
            self.set_i32s(
                acamera_metadata_tag::ACAMERA_CONTROL_AE_TARGET_FPS_RANGE,
                &[range.min as i32, range.max as i32],
            )?;
        }
        if let Some(mode) = request.control_mode {
            self.set_u8(acamera_metadata_tag::ACAMERA_CONTROL_MODE, mode.to_raw())?;
        }
        Ok(())
    }
}
