// This is free and unencumbered software released into the public domain.

//! CLI helpers (error reporting, verbosity handling).
//!
//! This module must compile even when the crate feature `cli` is disabled,
//! because the library is built in non-CLI configurations.

#[cfg(feature = "cli")]
use crate::shared::CameraError;

#[cfg(feature = "cli")]
use asimov_module::SysexitsError::{self, *};

#[cfg(feature = "cli")]
use clientele::StandardOptions;

#[cfg(feature = "cli")]
pub fn handle_error(err: &CameraError, flags: &StandardOptions) -> SysexitsError {
    tracing::error!(%err, "depth camera command failed");
    if flags.debug || flags.verbose >= 2 {
        tracing::debug!(?err, "detailed error");
    }

    report_error(err, flags);
    map_error_to_sysexit(err)
}

#[cfg(feature = "cli")]
pub fn info_user(flags: &StandardOptions, msg: &str) {
    if flags.debug || flags.verbose >= 1 {
        eprintln!("INFO: {msg}");
    }
    tracing::info!("{msg}");
}

#[cfg(feature = "cli")]
pub fn warn_user(flags: &StandardOptions, msg: &str) {
    if flags.debug || flags.verbose >= 1 {
        eprintln!("WARN: {msg}");
    }
    tracing::warn!("{msg}");
}

#[cfg(feature = "cli")]
fn report_error(err: &CameraError, flags: &StandardOptions) {
    use std::error::Error as _;
    use std::io::Write;

    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "ERROR: {err}");

    if flags.debug || flags.verbose >= 2 {
        let mut source = err.source();
        while let Some(cause) = source {
            let _ = writeln!(stderr, "  Caused by: {}", cause);
            source = cause.source();
        }
    }
}

#[cfg(feature = "cli")]
pub fn map_error_to_sysexit(err: &CameraError) -> SysexitsError {
    match err {
        CameraError::NoDriver => EX_UNAVAILABLE,
        CameraError::NoCamera | CameraError::NoDepthCamera => EX_UNAVAILABLE,
        CameraError::PermissionDenied => EX_NOPERM,
        CameraError::NotConfigured => EX_CONFIG,
        CameraError::InvalidConfig(_) => EX_USAGE,
        CameraError::Unsupported(_) => EX_UNAVAILABLE,
        CameraError::Disconnected | CameraError::Closed => EX_IOERR,
        CameraError::ConfigureFailed => EX_SOFTWARE,
        CameraError::DriverError { .. } => EX_SOFTWARE,
        CameraError::Other(_) => EX_SOFTWARE,
    }
}

// When `cli` is disabled, keep the module linkable without exposing CLI-only types.
#[cfg(not(feature = "cli"))]
#[inline]
pub fn info_user(_msg: &str) {}

#[cfg(not(feature = "cli"))]
#[inline]
pub fn warn_user(_msg: &str) {}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_exit_codes() {
        assert!(matches!(map_error_to_sysexit(&CameraError::NoDriver), EX_UNAVAILABLE));
        assert!(matches!(map_error_to_sysexit(&CameraError::NoDepthCamera), EX_UNAVAILABLE));
        assert!(matches!(map_error_to_sysexit(&CameraError::PermissionDenied), EX_NOPERM));
        assert!(matches!(
            map_error_to_sysexit(&CameraError::invalid_config("x")),
            EX_USAGE
        ));
        assert!(matches!(map_error_to_sysexit(&CameraError::Disconnected), EX_IOERR));
    }
}
