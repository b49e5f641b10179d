// This is free and unencumbered software released into the public domain.

use crate::shared::{
    CameraError, CameraEvent, CameraHost, CaptureRequest, ControlMode, DEPTH16_FORMAT,
    DepthCameraConfig, DeviceListener, Dispatcher, FrameSink, HostDevice, HostSession,
    RequestTemplate, StreamSpec, find_depth_camera,
};
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use tracing::{debug, error, info, warn};

/// Vendor metadata key for the depth filter type on Samsung ToF sensors.
pub const SAMSUNG_DEPTH_FILTER_TYPE: &str = "samsung.android.depth.filterType";

const EVENT_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Opened,
    Configured,
    Streaming,
}

/// A depth camera driving one repeating DEPTH16 capture request.
pub struct DepthCamera {
    host: Box<dyn CameraHost>,
    config: DepthCameraConfig,
    dispatcher: Dispatcher,
    events_tx: SyncSender<CameraEvent>,
    events_rx: Receiver<CameraEvent>,
    device: Option<Box<dyn HostDevice>>,
    session: Option<Box<dyn HostSession>>,
    request: Option<CaptureRequest>,
    vendor_tags: Vec<&'static str>,
    state: SessionState,
}

impl core::fmt::Debug for DepthCamera {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DepthCamera")
            .field("host", &self.host.name())
            .field("config", &self.config)
            .field("device", &self.device.as_ref().map(|d| d.id().to_string()))
            .field("state", &self.state)
            .finish()
    }
}

impl DepthCamera {
    pub fn new(host: Box<dyn CameraHost>, config: DepthCameraConfig) -> Result<Self, CameraError> {
        config.validate()?;

        let (events_tx, events_rx) = sync_channel(EVENT_CAPACITY);
        let dispatcher = Dispatcher::new(config.buffer_frames, events_tx.clone());

        Ok(Self {
            host,
            config,
            dispatcher,
            events_tx,
            events_rx,
            device: None,
            session: None,
            request: None,
            vendor_tags: Vec::new(),
            state: SessionState::Closed,
        })
    }

    pub fn config(&self) -> &DepthCameraConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn camera_id(&self) -> Option<&str> {
        self.device.as_ref().map(|d| d.id())
    }

    /// The request currently repeating, if any.
    pub fn repeating_request(&self) -> Option<&CaptureRequest> {
        match self.state {
            SessionState::Streaming => self.request.as_ref(),
            _ => None,
        }
    }

    /// Vendor keys probed after the repeating request started.
    pub fn probed_vendor_tags(&self) -> &[&'static str] {
        &self.vendor_tags
    }

    pub fn add_sink(&self, sink: FrameSink) {
        self.dispatcher.add_sink(sink);
    }

    pub fn events(&self) -> &Receiver<CameraEvent> {
        &self.events_rx
    }

    /// Opens the configured depth camera and starts streaming.
    ///
    /// An explicit `config.device` wins over selection by lens facing.
    pub fn open_front_depth_camera(&mut self) -> Result<(), CameraError> {
        let camera_id = match self.config.device.clone() {
            Some(id) => id,
            None => match find_depth_camera(self.host.as_ref(), self.config.facing)? {
                Some(chars) => {
                    if self.config.diagnostics {
                        self.diagnose(&chars.id, format!("{chars:?}"));
                    }
                    let (w, h) = (self.config.width, self.config.height);
                    if !chars.depth_stream_configurations.is_empty()
                        && !chars.supports_depth16_size(w, h)
                    {
                        let message = format!("camera does not list a {w}x{h} DEPTH16 stream");
                        warn!(camera_id = %chars.id, "{message}");
                        self.report(CameraEvent::Warning { message });
                    }
                    chars.id
                },
                None => {
                    error!("No suitable front depth camera found");
                    return Err(CameraError::NoDepthCamera);
                },
            },
        };

        info!("Opening front depth camera with ID: {camera_id}");
        self.open_camera(&camera_id)
    }

    pub fn open_camera(&mut self, camera_id: &str) -> Result<(), CameraError> {
        if camera_id.is_empty() {
            error!("camera id was empty, aborting open");
            return Err(CameraError::invalid_config("empty camera id"));
        }
        if self.state != SessionState::Closed {
            warn!(camera_id, state = ?self.state, "camera already open");
            return Err(CameraError::other("camera already open"));
        }

        if let Err(err) = self.host.check_permission() {
            error!("Permission not available to open camera");
            return Err(err);
        }

        let listener = DeviceListener::new(camera_id, self.events_tx.clone());
        let device = self
            .host
            .open_device(camera_id, listener)
            .inspect_err(|err| error!(camera_id, %err, "opening camera failed"))?;

        self.on_opened(device)
    }

    fn on_opened(&mut self, device: Box<dyn HostDevice>) -> Result<(), CameraError> {
        let camera_id = device.id().to_string();
        debug!(camera_id = %camera_id, "camera opened");
        self.device = Some(device);
        self.state = SessionState::Opened;
        self.report(CameraEvent::Opened {
            camera_id: camera_id.clone(),
        });

        let mut request = CaptureRequest::new(RequestTemplate::Preview)
            .with_jpeg_orientation(self.config.jpeg_orientation)
            .with_ae_target_fps_range(self.config.fps_range);
        request.add_target();

        let stream = StreamSpec {
            width: self.config.width,
            height: self.config.height,
            format: DEPTH16_FORMAT,
            max_images: self.config.max_images,
        };
        let output = self.dispatcher.output();
        if self.config.diagnostics {
            self.diagnose(&camera_id, format!("{stream:?} {request:?}"));
        }

        let Some(device) = self.device.as_mut() else {
            return Err(CameraError::NotConfigured);
        };
        match device.create_capture_session(&stream, output) {
            Ok(session) => self.on_session_configured(session, request),
            Err(err) => {
                error!(camera_id = %camera_id, %err, "Creating Capture Session failed");
                self.report(CameraEvent::ConfigureFailed { camera_id });
                Err(CameraError::ConfigureFailed)
            },
        }
    }

    fn on_session_configured(
        &mut self,
        session: Box<dyn HostSession>,
        request: CaptureRequest,
    ) -> Result<(), CameraError> {
        let camera_id = self.camera_id().unwrap_or_default().to_string();
        info!(camera_id = %camera_id, "Capture Session created");
        self.state = SessionState::Configured;
        self.report(CameraEvent::Configured {
            camera_id: camera_id.clone(),
        });

        let request = request.with_control_mode(ControlMode::Auto);
        let session = self.session.insert(session);
        if let Err(err) = session.set_repeating_request(&request) {
            error!(camera_id = %camera_id, %err, "setting repeating request failed");
            self.report(CameraEvent::Error {
                error: CameraError::other(format!("setting repeating request failed: {err}")),
            });
            return Err(err);
        }

        if self.config.vendor_tags {
            self.vendor_tags = log_vendor_depth_tags(&request);
        }

        self.request = Some(request);
        self.state = SessionState::Streaming;
        self.report(CameraEvent::Streaming { camera_id });
        Ok(())
    }

    /// Stops the repeating request and releases the session and device.
    pub fn stop(&mut self) -> Result<(), CameraError> {
        let mut result = Ok(());
        if let Some(mut session) = self.session.take() {
            if self.state == SessionState::Streaming {
                result = session.stop_repeating();
            }
            session.close();
        }
        if let Some(mut device) = self.device.take() {
            device.close();
        }
        self.request = None;
        self.vendor_tags.clear();
        self.state = SessionState::Closed;
        self.dispatcher.stop();
        result
    }

    fn diagnose(&self, camera_id: &str, detail: String) {
        debug!(camera_id, "{detail}");
        self.report(CameraEvent::Diagnostics {
            camera_id: camera_id.to_string(),
            detail,
        });
    }

    fn report(&self, event: CameraEvent) {
        let _ = self.events_tx.try_send(event);
    }
}

impl Drop for DepthCamera {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Logs the intent to read vendor depth tuning tags and returns the keys
/// probed.
///
/// Vendor tags are not reachable through the public capture request; nothing
/// is read here.
pub fn log_vendor_depth_tags(request: &CaptureRequest) -> Vec<&'static str> {
    info!(
        tag = SAMSUNG_DEPTH_FILTER_TYPE,
        template = ?request.template,
        "attempting to access vendor tags for depth tuning"
    );
    vec![SAMSUNG_DEPTH_FILTER_TYPE]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{
        DepthFrame, FpsRange, LensFacing, StreamConfiguration,
        drivers::fake::{FakeCamera, FakeHost},
    };
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    fn host() -> FakeHost {
        FakeHost::new(vec![
            FakeCamera::color("0", LensFacing::Back),
            FakeCamera::depth("4", Some(LensFacing::Front)),
        ])
    }

    fn camera(host: FakeHost) -> DepthCamera {
        DepthCamera::new(Box::new(host), DepthCameraConfig::default()).unwrap()
    }

    fn drain(camera: &DepthCamera) -> Vec<CameraEvent> {
        camera.events().try_iter().collect()
    }

    #[test]
    fn opens_front_depth_camera_and_streams() {
        let host = host();
        let calls = host.calls.clone();
        let mut camera = camera(host);

        camera.open_front_depth_camera().unwrap();

        assert_eq!(camera.state(), SessionState::Streaming);
        assert_eq!(camera.camera_id(), Some("4"));
        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "open 4".to_string(),
                "session 240x180 fmt=0x44363159 max=2".to_string(),
                "repeat".to_string(),
            ]
        );

        let request = camera.repeating_request().unwrap();
        assert_eq!(request.template, RequestTemplate::Preview);
        assert_eq!(request.jpeg_orientation, Some(0));
        assert_eq!(request.ae_target_fps_range, Some(FpsRange { min: 15, max: 30 }));
        assert_eq!(request.control_mode, Some(ControlMode::Auto));
        assert_eq!(request.targets, 1);

        let events = drain(&camera);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, CameraEvent::Opened { camera_id } if camera_id == "4"))
        );
        assert!(events.iter().any(|e| matches!(e, CameraEvent::Streaming { .. })));
    }

    #[test]
    fn frames_reach_sinks() {
        let mut host = host();
        host.frames_on_repeat = 3;
        let mut camera = camera(host);

        let seen: Arc<Mutex<Vec<u64>>> = Arc::default();
        let seen2 = Arc::clone(&seen);
        camera.add_sink(Arc::new(move |frame: DepthFrame| {
            assert_eq!(frame.camera_id, "4");
            seen2.lock().unwrap().push(frame.timestamp_ns);
        }));

        camera.open_front_depth_camera().unwrap();

        for _ in 0..100 {
            if seen.lock().unwrap().len() >= 2 {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        // Capacity 2: the third frame may be dropped.
        let seen = seen.lock().unwrap().clone();
        assert!(seen.starts_with(&[0, 1]));
    }

    #[test]
    fn missing_depth_camera_is_reported() {
        let host = FakeHost::new(vec![FakeCamera::color("0", LensFacing::Front)]);
        let calls = host.calls.clone();
        let mut camera = camera(host);

        assert!(matches!(
            camera.open_front_depth_camera(),
            Err(CameraError::NoDepthCamera)
        ));
        assert_eq!(camera.state(), SessionState::Closed);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn explicit_device_skips_selection() {
        let host = host();
        let calls = host.calls.clone();
        let config = DepthCameraConfig::default().with_device("0");
        let mut camera = DepthCamera::new(Box::new(host), config).unwrap();

        camera.open_front_depth_camera().unwrap();
        assert_eq!(camera.camera_id(), Some("0"));
        assert_eq!(calls.lock().unwrap()[0], "open 0");
    }

    #[test]
    fn permission_denied_does_not_open() {
        let mut host = host();
        host.permission = false;
        let calls = host.calls.clone();
        let mut camera = camera(host);

        assert!(matches!(
            camera.open_front_depth_camera(),
            Err(CameraError::PermissionDenied)
        ));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_id_is_rejected() {
        let mut camera = camera(host());
        assert!(matches!(
            camera.open_camera(""),
            Err(CameraError::InvalidConfig(_))
        ));
    }

    #[test]
    fn open_failure_propagates() {
        let mut host = host();
        host.fail_open = true;
        let mut camera = camera(host);

        assert!(camera.open_front_depth_camera().is_err());
        assert_eq!(camera.state(), SessionState::Closed);
    }

    #[test]
    fn configure_failure_leaves_device_open() {
        let mut host = host();
        host.fail_session = true;
        let mut camera = camera(host);

        assert!(matches!(
            camera.open_front_depth_camera(),
            Err(CameraError::ConfigureFailed)
        ));
        assert_eq!(camera.state(), SessionState::Opened);
        assert!(
            drain(&camera)
                .iter()
                .any(|e| matches!(e, CameraEvent::ConfigureFailed { .. }))
        );
    }

    #[test]
    fn stop_releases_everything() {
        let host = host();
        let calls = host.calls.clone();
        let mut camera = camera(host);
        camera.open_front_depth_camera().unwrap();

        camera.stop().unwrap();
        camera.stop().unwrap();

        assert_eq!(camera.state(), SessionState::Closed);
        assert!(camera.repeating_request().is_none());
        let calls = calls.lock().unwrap();
        assert_eq!(
            &calls[3..],
            &["stop repeating", "close session", "close device"]
        );
    }

    #[test]
    fn device_callbacks_are_published() {
        let host = host();
        let listener = host.listener.clone();
        let mut camera = camera(host);
        camera.open_front_depth_camera().unwrap();
        let _ = drain(&camera);

        let listener = listener.lock().unwrap().clone().unwrap();
        listener.on_disconnected();
        listener.on_error(1);

        let events: Vec<_> = drain(&camera)
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    CameraEvent::Disconnected { .. } | CameraEvent::DeviceError { .. }
                )
            })
            .collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], CameraEvent::Disconnected { .. }));
        assert!(matches!(events[1], CameraEvent::DeviceError { code: 1, .. }));
    }

    #[test]
    fn repeat_failure_leaves_session_configured() {
        let mut host = host();
        host.fail_repeat = true;
        let calls = host.calls.clone();
        let mut camera = camera(host);

        assert!(matches!(
            camera.open_front_depth_camera(),
            Err(CameraError::Other(_))
        ));
        assert_eq!(camera.state(), SessionState::Configured);
        assert!(camera.repeating_request().is_none());
        assert!(camera.probed_vendor_tags().is_empty());
        assert!(
            drain(&camera)
                .iter()
                .any(|e| matches!(e, CameraEvent::Error { .. }))
        );

        camera.stop().unwrap();
        assert_eq!(camera.state(), SessionState::Closed);
        let calls = calls.lock().unwrap();
        assert_eq!(&calls[2..], &["close session", "close device"]);
    }

    #[test]
    fn vendor_tags_are_probed_when_enabled() {
        let mut camera = camera(host());
        camera.open_front_depth_camera().unwrap();
        assert_eq!(camera.probed_vendor_tags(), &[SAMSUNG_DEPTH_FILTER_TYPE]);

        camera.stop().unwrap();
        assert!(camera.probed_vendor_tags().is_empty());
    }

    #[test]
    fn vendor_tags_can_be_skipped() {
        let config = DepthCameraConfig::default().with_vendor_tags(false);
        let mut camera = DepthCamera::new(Box::new(host()), config).unwrap();

        camera.open_front_depth_camera().unwrap();
        assert_eq!(camera.state(), SessionState::Streaming);
        assert!(camera.probed_vendor_tags().is_empty());
    }

    #[test]
    fn unlisted_depth_size_warns_and_opens_anyway() {
        let mut depth = FakeCamera::depth("4", Some(LensFacing::Front));
        depth.0.depth_stream_configurations =
            StreamConfiguration::parse_all(&[DEPTH16_FORMAT, 480, 360, 0]);
        let host = FakeHost::new(vec![depth]);
        let calls = host.calls.clone();
        let mut camera = camera(host);

        camera.open_front_depth_camera().unwrap();
        assert_eq!(camera.state(), SessionState::Streaming);
        assert_eq!(calls.lock().unwrap()[1], "session 240x180 fmt=0x44363159 max=2");

        let warnings: Vec<_> = drain(&camera)
            .into_iter()
            .filter_map(|e| match e {
                CameraEvent::Warning { message } => Some(message),
                _ => None,
            })
            .collect();
        assert_eq!(warnings, vec!["camera does not list a 240x180 DEPTH16 stream"]);
    }

    #[test]
    fn listed_depth_size_does_not_warn() {
        let mut camera = camera(host());
        camera.open_front_depth_camera().unwrap();
        assert!(
            !drain(&camera)
                .iter()
                .any(|e| matches!(e, CameraEvent::Warning { .. }))
        );
    }

    #[test]
    fn diagnostics_publish_selection_and_request_details() {
        let config = DepthCameraConfig::default().with_diagnostics(true);
        let mut camera = DepthCamera::new(Box::new(host()), config).unwrap();
        camera.open_front_depth_camera().unwrap();

        let details: Vec<_> = drain(&camera)
            .into_iter()
            .filter_map(|e| match e {
                CameraEvent::Diagnostics { camera_id, detail } => Some((camera_id, detail)),
                _ => None,
            })
            .collect();
        assert_eq!(details.len(), 2);
        assert!(details.iter().all(|(id, _)| id == "4"));
        assert!(details[0].1.contains("CameraCharacteristics"));
        assert!(details[1].1.contains("StreamSpec"));
        assert!(details[1].1.contains("CaptureRequest"));
    }

    #[test]
    fn diagnostics_are_quiet_by_default() {
        let mut camera = camera(host());
        camera.open_front_depth_camera().unwrap();
        assert!(
            !drain(&camera)
                .iter()
                .any(|e| matches!(e, CameraEvent::Diagnostics { .. }))
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = DepthCameraConfig::new(0, 0);
        assert!(DepthCamera::new(Box::new(host()), config).is_err());
    }
}
