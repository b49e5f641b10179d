// This is free and unencumbered software released into the public domain.

use super::{MediaResult, MediaStatus};
use crate::shared::DepthFrame;
use bytes::Bytes;
use core::ptr::null_mut;
use ndk_sys::{
    AImage, AImage_delete, AImage_getHeight, AImage_getPlaneData, AImage_getPlaneRowStride,
    AImage_getTimestamp, AImage_getWidth,
};

/// An image acquired from the reader; returned to the reader on drop.
#[derive(Debug)]
pub struct Image {
    pub(crate) handle: *mut AImage,
}

impl Default for Image {
    fn default() -> Self {
        Self { handle: null_mut() }
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { AImage_delete(self.handle) };
            self.handle = null_mut();
        }
    }
}

impl Image {
    pub fn timestamp(&self) -> MediaResult<i64> {
        let mut result = 0;
        MediaStatus::check(unsafe { AImage_getTimestamp(self.handle, &mut result) })?;
        Ok(result)
    }

    pub fn dimensions(&self) -> MediaResult<(usize, usize)> {
        let (mut width, mut height) = (0, 0);
        MediaStatus::check(unsafe { AImage_getWidth(self.handle, &mut width) })?;
        MediaStatus::check(unsafe { AImage_getHeight(self.handle, &mut height) })?;
        Ok((width.max(0) as usize, height.max(0) as usize))
    }

    /// Copies plane 0, the only plane of a DEPTH16 image.
    pub fn to_depth_frame(&self, camera_id: &str) -> MediaResult<DepthFrame> {
        let (width, height) = self.dimensions()?;

        let mut stride = 0;
        MediaStatus::check(unsafe { AImage_getPlaneRowStride(self.handle, 0, &mut stride) })?;

        let mut data = null_mut();
        let mut len = 0;
        MediaStatus::check(unsafe { AImage_getPlaneData(self.handle, 0, &mut data, &mut len) })?;

        let bytes = if data.is_null() || len <= 0 {
            Bytes::new()
        } else {
            Bytes::copy_from_slice(unsafe { core::slice::from_raw_parts(data, len as usize) })
        };

        Ok(DepthFrame::new_depth16(
            camera_id,
            bytes,
            width,
            height,
            stride.max(0) as usize,
            self.timestamp()?.max(0) as u64,
        ))
    }
}
