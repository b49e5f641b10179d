// This is free and unencumbered software released into the public domain.

use crate::shared::{CameraError, DepthFrame, FrameSink};
use std::{
    sync::{
        Arc, RwLock,
        atomic::{AtomicBool, Ordering},
        mpsc::{RecvTimeoutError, SyncSender, TrySendError, sync_channel},
    },
    thread::JoinHandle,
    time::Duration,
};

#[derive(Debug)]
pub enum CameraEvent {
    Started,
    Stopped,
    FrameDropped,
    Opened { camera_id: String },
    Configured { camera_id: String },
    ConfigureFailed { camera_id: String },
    Streaming { camera_id: String },
    Disconnected { camera_id: String },
    DeviceError { camera_id: String, code: i32 },
    Warning { message: String },
    Diagnostics { camera_id: String, detail: String },
    Error { error: CameraError },
}

pub enum FrameMsg {
    Frame(DepthFrame),
    Stop,
}

/// Hands frames from the platform's image callback over to the sinks.
pub struct Dispatcher {
    tx: SyncSender<FrameMsg>,
    events_tx: SyncSender<CameraEvent>,
    sinks: Arc<RwLock<Vec<FrameSink>>>,
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl Dispatcher {
    pub fn new(capacity: usize, events_tx: SyncSender<CameraEvent>) -> Self {
        let (tx, rx) = sync_channel::<FrameMsg>(capacity.max(1));
        let sinks: Arc<RwLock<Vec<FrameSink>>> = Arc::new(RwLock::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));

        let sinks2 = Arc::clone(&sinks);
        let stop2 = Arc::clone(&stop);
        let events2 = events_tx.clone();

        let join = std::thread::spawn(move || {
            let _ = events2.try_send(CameraEvent::Started);

            while !stop2.load(Ordering::Relaxed) {
                match rx.recv_timeout(Duration::from_millis(200)) {
                    Ok(FrameMsg::Frame(frame)) => {
                        if let Ok(list) = sinks2.read() {
                            for s in list.iter() {
                                (s)(frame.clone());
                            }
                        }
                    },
                    Ok(FrameMsg::Stop) => break,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            let _ = events2.try_send(CameraEvent::Stopped);
        });

        Self {
            tx,
            events_tx,
            sinks,
            stop,
            join: Some(join),
        }
    }

    pub fn output(&self) -> FrameOutput {
        FrameOutput {
            frame_tx: self.tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }

    pub fn add_sink(&self, sink: FrameSink) {
        if let Ok(mut g) = self.sinks.write() {
            g.push(sink);
        }
    }

    pub fn is_running(&self) -> bool {
        self.join.is_some()
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        let _ = self.tx.try_send(FrameMsg::Stop);
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Sending half given to the platform image listener.
#[derive(Clone)]
pub struct FrameOutput {
    frame_tx: SyncSender<FrameMsg>,
    events_tx: SyncSender<CameraEvent>,
}

impl FrameOutput {
    pub fn deliver(&self, frame: DepthFrame) {
        try_send_frame(&self.frame_tx, &self.events_tx, frame)
    }

    pub fn report(&self, event: CameraEvent) {
        let _ = self.events_tx.try_send(event);
    }
}

impl core::fmt::Debug for FrameOutput {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameOutput").finish_non_exhaustive()
    }
}

pub fn report_drop(events_tx: &SyncSender<CameraEvent>) {
    let _ = events_tx.try_send(CameraEvent::FrameDropped);
}

pub fn try_send_frame(
    frame_tx: &SyncSender<FrameMsg>,
    events_tx: &SyncSender<CameraEvent>,
    frame: DepthFrame,
) {
    match frame_tx.try_send(FrameMsg::Frame(frame)) {
        Ok(()) => {},
        Err(TrySendError::Full(_)) => report_drop(events_tx),
        Err(TrySendError::Disconnected(_)) => {
            let _ = events_tx.try_send(CameraEvent::Error {
                error: CameraError::Closed,
            });
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, mpsc::sync_channel};

    fn frame(ts: u64) -> DepthFrame {
        DepthFrame::new_depth16("4", vec![0u8; 8], 2, 2, 4, ts)
    }

    #[test]
    fn forwards_frames_to_every_sink() {
        let (events_tx, _events_rx) = sync_channel(16);
        let mut dispatcher = Dispatcher::new(4, events_tx);

        let (seen_tx, seen_rx) = std::sync::mpsc::channel::<(u8, u64)>();
        for id in 0..2u8 {
            let seen_tx = Mutex::new(seen_tx.clone());
            dispatcher.add_sink(Arc::new(move |f: DepthFrame| {
                let _ = seen_tx.lock().unwrap().send((id, f.timestamp_ns));
            }));
        }

        dispatcher.output().deliver(frame(7));

        let mut seen = vec![
            seen_rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            seen_rx.recv_timeout(Duration::from_secs(2)).unwrap(),
        ];
        seen.sort();
        assert_eq!(seen, vec![(0, 7), (1, 7)]);

        dispatcher.stop();
        assert!(!dispatcher.is_running());
    }

    #[test]
    fn full_channel_reports_drop() {
        let (frame_tx, _frame_rx) = sync_channel::<FrameMsg>(1);
        let (events_tx, events_rx) = sync_channel(4);

        try_send_frame(&frame_tx, &events_tx, frame(1));
        try_send_frame(&frame_tx, &events_tx, frame(2));

        assert!(matches!(events_rx.try_recv(), Ok(CameraEvent::FrameDropped)));
        assert!(events_rx.try_recv().is_err());
    }

    #[test]
    fn closed_channel_reports_error() {
        let (frame_tx, frame_rx) = sync_channel::<FrameMsg>(1);
        let (events_tx, events_rx) = sync_channel(4);
        drop(frame_rx);

        try_send_frame(&frame_tx, &events_tx, frame(1));
        assert!(matches!(
            events_rx.try_recv(),
            Ok(CameraEvent::Error {
                error: CameraError::Closed
            })
        ));
    }

    #[test]
    fn stop_is_idempotent_and_reports_lifecycle() {
        let (events_tx, events_rx) = sync_channel(16);
        let mut dispatcher = Dispatcher::new(1, events_tx);
        dispatcher.stop();
        dispatcher.stop();

        let events: Vec<_> = events_rx.try_iter().collect();
        assert!(matches!(events.first(), Some(CameraEvent::Started)));
        assert!(matches!(events.last(), Some(CameraEvent::Stopped)));
    }
}
