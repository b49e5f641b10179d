// This is free and unencumbered software released into the public domain.

use super::{Image, MediaResult, MediaStatus};
use crate::shared::{CameraEvent, FrameOutput, StreamSpec};
use core::{ffi::c_void, ptr::null_mut};
use ndk_sys::{
    AImageReader, AImageReader_ImageListener, AImageReader_acquireLatestImage,
    AImageReader_delete, AImageReader_new, AImageReader_setImageListener,
};
use tracing::{trace, warn};

/// Context handed to the native image listener.
#[derive(Debug)]
struct ListenerContext {
    camera_id: String,
    output: FrameOutput,
}

#[derive(Debug)]
pub struct ImageReader {
    pub(crate) handle: *mut AImageReader,
    listener: Box<AImageReader_ImageListener>,
    _context: Box<ListenerContext>,
}

impl Drop for ImageReader {
    fn drop(&mut self) {
        unsafe {
            AImageReader_delete(self.handle);
            self.handle = null_mut();
        }
    }
}

unsafe extern "C" fn on_image_available(context: *mut c_void, reader: *mut AImageReader) {
    let Some(ctx) = (unsafe { (context as *const ListenerContext).as_ref() }) else {
        return;
    };

    let mut image = Image::default();
    if MediaStatus::check(unsafe { AImageReader_acquireLatestImage(reader, &mut image.handle) })
        .is_err()
    {
        return;
    }

    match image.to_depth_frame(&ctx.camera_id) {
        Ok(frame) if frame.is_complete() => {
            trace!(camera_id = %ctx.camera_id, ts = frame.timestamp_ns, "depth frame");
            ctx.output.deliver(frame);
        },
        Ok(frame) => {
            warn!(
                camera_id = %ctx.camera_id,
                len = frame.data.len(),
                "dropping truncated depth frame"
            );
            ctx.output.report(CameraEvent::FrameDropped);
        },
        Err(err) => {
            warn!(camera_id = %ctx.camera_id, %err, "could not read depth image");
        },
    }
}

impl ImageReader {
    /// See: https://developer.android.com/ndk/reference/group/media#aimagereader_new
    pub fn new(stream: &StreamSpec, camera_id: &str, output: FrameOutput) -> MediaResult<Self> {
        let mut handle = null_mut();
        MediaStatus::check(unsafe {
            AImageReader_new(
                stream.width as _,
                stream.height as _,
                stream.format,
                stream.max_images as _,
                &mut handle,
            )
        })?;

        let mut context = Box::new(ListenerContext {
            camera_id: camera_id.to_string(),
            output,
        });
        let listener = Box::new(AImageReader_ImageListener {
            context: (&mut *context as *mut ListenerContext) as *mut c_void,
            onImageAvailable: Some(on_image_available),
        });

        let mut reader = Self {
            handle,
            listener,
            _context: context,
        };
        MediaStatus::check(unsafe {
            AImageReader_setImageListener(reader.handle, &mut *reader.listener)
        })?;
        Ok(reader)
    }
}
