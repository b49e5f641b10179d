// This is free and unencumbered software released into the public domain.

use super::{CameraResult, CameraStatus};
use crate::shared::DeviceListener;
use alloc::ffi::CString;
use core::{
    ffi::{c_int, c_void},
    ptr::null_mut,
};
use ndk_sys::{
    ACameraDevice, ACameraDevice_StateCallbacks, ACameraDevice_close,
    ACameraDevice_createCaptureRequest, ACameraDevice_request_template, ACaptureRequest,
};
use tracing::debug;

/// An open `ACameraDevice` together with its state callbacks.
///
/// The callbacks and the listener they point at are boxed so their
/// addresses stay put while the device is open.
#[derive(Debug)]
pub struct CameraDevice {
    pub(crate) id: CString,
    pub(crate) handle: *mut ACameraDevice,
    pub(crate) state_callbacks: Box<ACameraDevice_StateCallbacks>,
    listener: Box<DeviceListener>,
}

impl Drop for CameraDevice {
    fn drop(&mut self) {
        self.close();
    }
}

unsafe extern "C" fn on_disconnected(context: *mut c_void, _device: *mut ACameraDevice) {
    if let Some(listener) = unsafe { (context as *const DeviceListener).as_ref() } {
        listener.on_disconnected();
    }
}

unsafe extern "C" fn on_error(context: *mut c_void, _device: *mut ACameraDevice, error: c_int) {
    if let Some(listener) = unsafe { (context as *const DeviceListener).as_ref() } {
        listener.on_error(error as i32);
    }
}

impl CameraDevice {
    pub(crate) fn new(id: CString, listener: DeviceListener) -> Self {
        let mut listener = Box::new(listener);
        let state_callbacks = Box::new(ACameraDevice_StateCallbacks {
            context: (&mut *listener as *mut DeviceListener) as *mut c_void,
            onDisconnected: Some(on_disconnected),
            onError: Some(on_error),
        });
        Self {
            id,
            handle: null_mut(),
            state_callbacks,
            listener,
        }
    }

    pub fn id(&self) -> &str {
        self.listener.camera_id()
    }

    /// See: https://developer.android.com/ndk/reference/group/camera#acameradevice_createcapturerequest
    pub(crate) fn create_preview_request(&self) -> CameraResult<*mut ACaptureRequest> {
        let mut request = null_mut();
        CameraStatus::check(unsafe {
            ACameraDevice_createCaptureRequest(
                self.handle,
                ACameraDevice_request_template::TEMPLATE_PREVIEW,
                &mut request,
            )
        })?;
        Ok(request)
    }

    pub fn close(&mut self) {
        if self.handle.is_null() {
            return;
        }
        let status = unsafe { ACameraDevice_close(self.handle) };
        debug!(camera_id = self.id(), ?status, "ACameraDevice_close");
        self.handle = null_mut();
    }
}
