// This is free and unencumbered software released into the public domain.

use super::{CameraError, CameraHost};

cfg_if::cfg_if! {
    if #[cfg(all(feature = "android", target_os = "android"))] {
        /// The camera host for the current target.
        pub fn open_host() -> Result<Box<dyn CameraHost>, CameraError> {
            Ok(Box::new(super::drivers::android::AndroidCameraHost::new()?))
        }
    } else {
        /// The camera host for the current target.
        pub fn open_host() -> Result<Box<dyn CameraHost>, CameraError> {
            Err(CameraError::NoDriver)
        }
    }
}

#[cfg(all(test, not(all(feature = "android", target_os = "android"))))]
mod tests {
    use super::*;

    #[test]
    fn no_host_without_backend() {
        assert!(matches!(open_host(), Err(CameraError::NoDriver)));
    }
}
