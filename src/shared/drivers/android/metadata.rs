// This is free and unencumbered software released into the public domain.

use super::{CameraResult, CameraStatus};
use crate::shared::{Capability, CameraCharacteristics, LensFacing, StreamConfiguration};
use core::{mem::zeroed, ptr::null_mut, slice};
use ndk_sys::{
    ACameraMetadata, ACameraMetadata_const_entry, ACameraMetadata_free,
    ACameraMetadata_getConstEntry, acamera_metadata_tag, camera_status_t,
};

/// Owned `ACameraMetadata` as returned by the camera manager.
#[derive(Debug)]
pub struct CameraMetadata {
    pub(crate) handle: *mut ACameraMetadata,
}

impl Default for CameraMetadata {
    fn default() -> Self {
        Self { handle: null_mut() }
    }
}

impl Drop for CameraMetadata {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ACameraMetadata_free(self.handle) };
            self.handle = null_mut();
        }
    }
}

impl CameraMetadata {
    /// See: https://developer.android.com/ndk/reference/group/camera#acamerametadata_getconstentry
    fn entry(
        &self,
        tag: acamera_metadata_tag,
    ) -> CameraResult<Option<ACameraMetadata_const_entry>> {
        let mut entry: ACameraMetadata_const_entry = unsafe { zeroed() };
        let status = unsafe { ACameraMetadata_getConstEntry(self.handle, tag.0, &mut entry) };
        if status == camera_status_t::ACAMERA_ERROR_METADATA_NOT_FOUND {
            return Ok(None);
        }
        CameraStatus::check(status)?;
        Ok(Some(entry))
    }

    pub fn u8s(&self, tag: acamera_metadata_tag) -> CameraResult<Vec<u8>> {
        Ok(match self.entry(tag)? {
            Some(e) if e.count > 0 => {
                unsafe { slice::from_raw_parts(e.data.u8_, e.count as usize) }.to_vec()
            },
            _ => Vec::new(),
        })
    }

    pub fn i32s(&self, tag: acamera_metadata_tag) -> CameraResult<Vec<i32>> {
        Ok(match self.entry(tag)? {
            Some(e) if e.count > 0 => {
                unsafe { slice::from_raw_parts(e.data.i32_, e.count as usize) }.to_vec()
            },
            _ => Vec::new(),
        })
    }

    pub fn f32s(&self, tag: acamera_metadata_tag) -> CameraResult<Vec<f32>> {
        Ok(match self.entry(tag)? {
            Some(e) if e.count > 0 => {
                unsafe { slice::from_raw_parts(e.data.f, e.count as usize) }.to_vec()
            },
            _ => Vec::new(),
        })
    }

    pub fn to_characteristics(&self, id: &str) -> CameraResult<CameraCharacteristics> {
        let mut chars = CameraCharacteristics::new(id);

        chars.lens_facing = self
            .u8s(acamera_metadata_tag::ACAMERA_LENS_FACING)?
            .first()
            .and_then(|raw| LensFacing::from_raw(*raw));

        chars.capabilities = self
            .i32s(acamera_metadata_tag::ACAMERA_REQUEST_AVAILABLE_CAPABILITIES)?
            .into_iter()
            .map(Capability::from_raw)
            .collect();

        let size = self.f32s(acamera_metadata_tag::ACAMERA_SENSOR_INFO_PHYSICAL_SIZE)?;
        if let [w, h, ..] = size[..] {
            chars.sensor_physical_size = Some((w, h));
        }

        chars.focal_lengths =
            self.f32s(acamera_metadata_tag::ACAMERA_LENS_INFO_AVAILABLE_FOCAL_LENGTHS)?;

        chars.depth_stream_configurations = StreamConfiguration::parse_all(
            &self.i32s(acamera_metadata_tag::ACAMERA_DEPTH_AVAILABLE_DEPTH_STREAM_CONFIGURATIONS)?,
        );

        Ok(chars)
    }
}
