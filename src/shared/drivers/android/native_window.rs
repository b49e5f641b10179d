// This is free and unencumbered software released into the public domain.

use super::{ImageReader, MediaResult, MediaStatus};
use core::ptr::null_mut;
use ndk_sys::{ANativeWindow, ANativeWindow_acquire, ANativeWindow_release, AImageReader_getWindow};

/// A reference to the image reader's window.
///
/// The reader owns the window; we hold an extra reference until drop.
#[derive(Debug)]
pub struct NativeWindow {
    pub(crate) handle: *mut ANativeWindow,
}

impl Drop for NativeWindow {
    fn drop(&mut self) {
        unsafe {
            ANativeWindow_release(self.handle);
            self.handle = null_mut();
        }
    }
}

impl NativeWindow {
    /// See: https://developer.android.com/ndk/reference/group/media#aimagereader_getwindow
    pub fn from_reader(reader: &ImageReader) -> MediaResult<Self> {
        let mut handle = null_mut();
        MediaStatus::check(unsafe { AImageReader_getWindow(reader.handle, &mut handle) })?;
        unsafe { ANativeWindow_acquire(handle) };
        Ok(Self { handle })
    }
}
