// This is free and unencumbered software released into the public domain.

use super::{CameraDevice, CameraMetadata, CameraResult, CameraStatus};
use crate::shared::{CameraError, DeviceListener};
use alloc::ffi::CString;
use core::{ffi::CStr, ptr::null_mut};
use ndk_sys::{
    ACameraManager, ACameraManager_create, ACameraManager_delete,
    ACameraManager_deleteCameraIdList, ACameraManager_getCameraCharacteristics,
    ACameraManager_getCameraIdList, ACameraManager_openCamera,
};
use scopeguard::defer;

#[derive(Debug)]
pub struct CameraManager {
    pub(crate) handle: *mut ACameraManager,
}

impl Drop for CameraManager {
    fn drop(&mut self) {
        unsafe {
            ACameraManager_delete(self.handle);
            self.handle = null_mut();
        }
    }
}

impl CameraManager {
    pub fn new() -> Result<Self, CameraError> {
        let handle = unsafe { ACameraManager_create() };
        if handle.is_null() {
            return Err(CameraError::NoDriver);
        }
        Ok(Self { handle })
    }

    pub fn get_camera_ids(&self) -> CameraResult<Vec<String>> {
        let mut list_ptr = null_mut();
        CameraStatus::check(unsafe { ACameraManager_getCameraIdList(self.handle, &mut list_ptr) })?;

        defer! {
            unsafe { ACameraManager_deleteCameraIdList(list_ptr); }
        }

        let list = unsafe { &*list_ptr };
        if list.numCameras < 1 {
            return Ok(Vec::new());
        }

        let ids = unsafe { core::slice::from_raw_parts(list.cameraIds, list.numCameras as usize) };
        Ok(ids
            .iter()
            .map(|p| unsafe { CStr::from_ptr(*p) }.to_string_lossy().into_owned())
            .collect())
    }

    /// See: https://developer.android.com/ndk/reference/group/camera#acameramanager_getcameracharacteristics
    pub fn get_characteristics(&self, id: &CStr) -> CameraResult<CameraMetadata> {
        let mut result = CameraMetadata::default();
        CameraStatus::check(unsafe {
            ACameraManager_getCameraCharacteristics(self.handle, id.as_ptr(), &mut result.handle)
        })?;
        Ok(result)
    }

    /// See: https://developer.android.com/ndk/reference/group/camera#acameramanager_opencamera
    pub fn open_camera(&self, id: CString, listener: DeviceListener) -> CameraResult<CameraDevice> {
        let mut device = CameraDevice::new(id, listener);
        CameraStatus::check(unsafe {
            ACameraManager_openCamera(
                self.handle,
                device.id.as_ptr(),
                &mut *device.state_callbacks,
                &mut device.handle,
            )
        })?;
        Ok(device)
    }
}
