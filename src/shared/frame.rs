// This is free and unencumbered software released into the public domain.

use bytes::Bytes;
use std::sync::Arc;

/// Platform image format code for DEPTH16.
pub const DEPTH16_FORMAT: i32 = 0x4436_3159;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// 16 bits per pixel, little-endian.
    Depth16,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Depth16 => 2,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DepthFrame {
    pub camera_id: String,
    pub data: Bytes,
    pub width: usize,
    pub height: usize,
    /// Row stride in bytes.
    pub stride: usize,
    pub timestamp_ns: u64,
    pub pixel_format: PixelFormat,
}

pub type FrameSink = Arc<dyn Fn(DepthFrame) + Send + Sync + 'static>;

impl DepthFrame {
    pub fn new_depth16(
        camera_id: impl Into<String>,
        data: impl Into<Bytes>,
        width: usize,
        height: usize,
        stride: usize,
        timestamp_ns: u64,
    ) -> Self {
        Self {
            camera_id: camera_id.into(),
            data: data.into(),
            width,
            height,
            stride,
            timestamp_ns,
            pixel_format: PixelFormat::Depth16,
        }
    }

    fn row_bytes(&self) -> usize {
        self.width * self.pixel_format.bytes_per_pixel()
    }

    /// Whether the plane covers every row of the frame.
    pub fn is_complete(&self) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }
        if self.stride < self.row_bytes() {
            return false;
        }
        self.data.len() >= self.stride * (self.height - 1) + self.row_bytes()
    }

    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride;
        self.data.get(start..start + self.row_bytes())
    }

    /// Raw DEPTH16 sample at `(x, y)`, range and confidence bits included.
    pub fn sample(&self, x: usize, y: usize) -> Option<u16> {
        if x >= self.width {
            return None;
        }
        let row = self.row(y)?;
        let i = x * 2;
        Some(u16::from_le_bytes([row[i], row[i + 1]]))
    }
}
