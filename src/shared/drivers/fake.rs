// This is free and unencumbered software released into the public domain.

//! Scripted in-memory host for exercising the session logic.

use crate::shared::{
    CameraCharacteristics, CameraError, CaptureRequest, Capability, CameraHost, DEPTH16_FORMAT,
    DepthFrame, DeviceListener, FrameOutput, HostDevice, HostSession, LensFacing,
    StreamConfiguration, StreamSpec,
};
use alloc::borrow::Cow;
use std::sync::{Arc, Mutex};

pub type Calls = Arc<Mutex<Vec<String>>>;

#[derive(Clone, Debug)]
pub struct FakeCamera(pub CameraCharacteristics);

impl FakeCamera {
    pub fn color(id: &str, facing: LensFacing) -> Self {
        let mut chars = CameraCharacteristics::new(id);
        chars.lens_facing = Some(facing);
        chars.capabilities = vec![Capability::from_raw(0)];
        Self(chars)
    }

    pub fn depth(id: &str, facing: Option<LensFacing>) -> Self {
        let mut chars = CameraCharacteristics::new(id);
        chars.lens_facing = facing;
        chars.capabilities = vec![Capability::from_raw(0), Capability::DepthOutput];
        chars.sensor_physical_size = Some((4.8, 1.2));
        chars.focal_lengths = vec![2.0];
        chars.depth_stream_configurations = StreamConfiguration::parse_all(&[
            DEPTH16_FORMAT, 240, 180, 0, //
            DEPTH16_FORMAT, 480, 360, 0,
        ]);
        Self(chars)
    }
}

#[derive(Debug, Default)]
pub struct FakeHost {
    pub cameras: Vec<FakeCamera>,
    pub unreadable: Vec<String>,
    pub fail_enumeration: bool,
    pub permission: bool,
    pub fail_open: bool,
    pub fail_session: bool,
    pub fail_repeat: bool,
    pub frames_on_repeat: u64,
    pub calls: Calls,
    pub listener: Arc<Mutex<Option<DeviceListener>>>,
}

impl FakeHost {
    pub fn new(cameras: Vec<FakeCamera>) -> Self {
        Self {
            cameras,
            permission: true,
            ..Default::default()
        }
    }

    fn record(calls: &Calls, call: impl Into<String>) {
        calls.lock().unwrap().push(call.into());
    }
}

impl dogma::Named for FakeHost {
    fn name(&self) -> Cow<'_, str> {
        "fake".into()
    }
}

impl CameraHost for FakeHost {
    fn camera_ids(&self) -> Result<Vec<String>, CameraError> {
        if self.fail_enumeration {
            return Err(CameraError::other("camera service unavailable"));
        }
        Ok(self.cameras.iter().map(|c| c.0.id.clone()).collect())
    }

    fn characteristics(&self, camera_id: &str) -> Result<CameraCharacteristics, CameraError> {
        if self.unreadable.iter().any(|id| id == camera_id) {
            return Err(CameraError::other("metadata not found"));
        }
        self.cameras
            .iter()
            .find(|c| c.0.id == camera_id)
            .map(|c| c.0.clone())
            .ok_or(CameraError::NoCamera)
    }

    fn check_permission(&self) -> Result<(), CameraError> {
        if self.permission {
            Ok(())
        } else {
            Err(CameraError::PermissionDenied)
        }
    }

    fn open_device(
        &mut self,
        camera_id: &str,
        listener: DeviceListener,
    ) -> Result<Box<dyn HostDevice>, CameraError> {
        if self.fail_open {
            return Err(CameraError::Disconnected);
        }
        Self::record(&self.calls, format!("open {camera_id}"));
        *self.listener.lock().unwrap() = Some(listener);
        Ok(Box::new(FakeDevice {
            id: camera_id.to_string(),
            fail_session: self.fail_session,
            fail_repeat: self.fail_repeat,
            frames_on_repeat: self.frames_on_repeat,
            calls: Arc::clone(&self.calls),
        }))
    }
}

#[derive(Debug)]
struct FakeDevice {
    id: String,
    fail_session: bool,
    fail_repeat: bool,
    frames_on_repeat: u64,
    calls: Calls,
}

impl HostDevice for FakeDevice {
    fn id(&self) -> &str {
        &self.id
    }

    fn create_capture_session(
        &mut self,
        stream: &StreamSpec,
        output: FrameOutput,
    ) -> Result<Box<dyn HostSession>, CameraError> {
        if self.fail_session {
            return Err(CameraError::other("stream configure failed"));
        }
        FakeHost::record(
            &self.calls,
            format!(
                "session {}x{} fmt={:#x} max={}",
                stream.width, stream.height, stream.format, stream.max_images
            ),
        );
        Ok(Box::new(FakeSession {
            camera_id: self.id.clone(),
            stream: *stream,
            output,
            fail_repeat: self.fail_repeat,
            frames_on_repeat: self.frames_on_repeat,
            calls: Arc::clone(&self.calls),
        }))
    }

    fn close(&mut self) {
        FakeHost::record(&self.calls, "close device");
    }
}

#[derive(Debug)]
struct FakeSession {
    camera_id: String,
    stream: StreamSpec,
    output: FrameOutput,
    fail_repeat: bool,
    frames_on_repeat: u64,
    calls: Calls,
}

impl HostSession for FakeSession {
    fn set_repeating_request(&mut self, request: &CaptureRequest) -> Result<(), CameraError> {
        if request.targets == 0 {
            return Err(CameraError::other("request has no targets"));
        }
        if self.fail_repeat {
            return Err(CameraError::other("repeating request rejected"));
        }
        FakeHost::record(&self.calls, "repeat");

        let (w, h) = (self.stream.width as usize, self.stream.height as usize);
        for ts in 0..self.frames_on_repeat {
            let data = vec![0u8; w * h * 2];
            self.output.deliver(DepthFrame::new_depth16(
                self.camera_id.clone(),
                data,
                w,
                h,
                w * 2,
                ts,
            ));
        }
        Ok(())
    }

    fn stop_repeating(&mut self) -> Result<(), CameraError> {
        FakeHost::record(&self.calls, "stop repeating");
        Ok(())
    }

    fn close(&mut self) {
        FakeHost::record(&self.calls, "close session");
    }
}
