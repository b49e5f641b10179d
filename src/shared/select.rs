// This is free and unencumbered software released into the public domain.

use crate::shared::{CameraCharacteristics, CameraError, CameraHost, LensFacing};
use tracing::{error, info, warn};

/// Characteristics of every camera the host lists, in host order.
///
/// Cameras whose characteristics cannot be read are skipped.
pub fn camera_characteristics(
    host: &dyn CameraHost,
) -> Result<Vec<CameraCharacteristics>, CameraError> {
    let ids = host.camera_ids().inspect_err(|err| {
        error!(%err, "error enumerating cameras");
    })?;

    let mut result = Vec::with_capacity(ids.len());
    for id in ids {
        match host.characteristics(&id) {
            Ok(chars) => result.push(chars),
            Err(err) => warn!(camera_id = %id, %err, "could not read camera characteristics"),
        }
    }
    Ok(result)
}

/// Logs and returns every camera that supports depth output.
pub fn log_all_depth_output_cameras(
    host: &dyn CameraHost,
) -> Result<Vec<CameraCharacteristics>, CameraError> {
    let depth: Vec<_> = camera_characteristics(host)?
        .into_iter()
        .filter(CameraCharacteristics::is_depth_capable)
        .collect();

    for chars in &depth {
        info!(
            "Camera ID: {}, Facing: {} supports DEPTH_OUTPUT",
            chars.id,
            chars.facing_label()
        );
    }

    Ok(depth)
}

/// The first depth-capable camera facing `facing`, in host order.
pub fn find_depth_camera(
    host: &dyn CameraHost,
    facing: LensFacing,
) -> Result<Option<CameraCharacteristics>, CameraError> {
    for chars in camera_characteristics(host)? {
        let facing_front = chars.is_front_facing();
        let depth_capable = chars.is_depth_capable();
        info!(
            camera_id = %chars.id,
            facing = chars.facing_label(),
            facing_front,
            depth_capable,
            "{}",
            candidate_summary(&chars)
        );

        if chars.lens_facing == Some(facing) && depth_capable {
            match chars.sensor_physical_size {
                Some((w, h)) => info!(camera_id = %chars.id, "sensor size: {w}x{h}"),
                None => info!(camera_id = %chars.id, "sensor size: unknown"),
            }
            if let Some(fov) = chars.field_of_view() {
                info!(camera_id = %chars.id, fov, "calculated field of view");
            }
            return Ok(Some(chars));
        }
    }
    Ok(None)
}

fn candidate_summary(chars: &CameraCharacteristics) -> String {
    format!(
        "Camera ID: {}, facingFront={}, depthCapable={}",
        chars.id,
        chars.is_front_facing(),
        chars.is_depth_capable()
    )
}

pub fn find_front_depth_camera(
    host: &dyn CameraHost,
) -> Result<Option<CameraCharacteristics>, CameraError> {
    find_depth_camera(host, LensFacing::Front)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::drivers::fake::{FakeCamera, FakeHost};

    fn host() -> FakeHost {
        FakeHost::new(vec![
            FakeCamera::color("0", LensFacing::Back),
            FakeCamera::color("1", LensFacing::Front),
            FakeCamera::depth("2", Some(LensFacing::Back)),
            FakeCamera::depth("4", Some(LensFacing::Front)),
            FakeCamera::depth("5", Some(LensFacing::Front)),
        ])
    }

    #[test]
    fn picks_first_front_depth_camera() {
        let found = find_front_depth_camera(&host()).unwrap().unwrap();
        assert_eq!(found.id, "4");
    }

    #[test]
    fn picks_requested_facing() {
        let found = find_depth_camera(&host(), LensFacing::Back).unwrap().unwrap();
        assert_eq!(found.id, "2");
        assert!(find_depth_camera(&host(), LensFacing::External).unwrap().is_none());
    }

    #[test]
    fn no_depth_camera_is_none() {
        let host = FakeHost::new(vec![FakeCamera::color("0", LensFacing::Front)]);
        assert!(find_front_depth_camera(&host).unwrap().is_none());
    }

    #[test]
    fn lists_depth_cameras_of_any_facing() {
        let mut cameras = vec![FakeCamera::depth("7", None)];
        cameras.extend(host().cameras);
        let host = FakeHost::new(cameras);

        let ids: Vec<_> = log_all_depth_output_cameras(&host)
            .unwrap()
            .into_iter()
            .map(|c| (c.id.clone(), c.facing_label()))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("7".to_string(), "UNKNOWN"),
                ("2".to_string(), "BACK"),
                ("4".to_string(), "FRONT"),
                ("5".to_string(), "FRONT"),
            ]
        );
    }

    #[test]
    fn summarizes_each_candidate() {
        let front_depth = FakeCamera::depth("4", Some(LensFacing::Front)).0;
        assert_eq!(
            candidate_summary(&front_depth),
            "Camera ID: 4, facingFront=true, depthCapable=true"
        );
        let back_color = FakeCamera::color("0", LensFacing::Back).0;
        assert_eq!(
            candidate_summary(&back_color),
            "Camera ID: 0, facingFront=false, depthCapable=false"
        );
    }

    #[test]
    fn unreadable_cameras_are_skipped() {
        let mut host = host();
        host.unreadable.push("4".into());
        let found = find_front_depth_camera(&host).unwrap().unwrap();
        assert_eq!(found.id, "5");
    }

    #[test]
    fn enumeration_failure_is_an_error() {
        let mut host = host();
        host.fail_enumeration = true;
        assert!(log_all_depth_output_cameras(&host).is_err());
        assert!(find_front_depth_camera(&host).is_err());
    }
}
