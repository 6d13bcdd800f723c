use std::fmt;
use std::time::Instant;

use crate::detection::domain::path_detector::PathDetector;
use crate::detection::domain::path_estimate::{DetectionStatus, PathDetection};
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::shared::frame::Frame;
use crate::video::domain::stream_source::{StreamError, StreamInfo, StreamSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Frames are passed through unchanged.
    View,
    /// Frames go through the path detector and come back annotated.
    #[default]
    Path,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::View => write!(f, "view"),
            Mode::Path => write!(f, "path"),
        }
    }
}

/// Last user-visible state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    EmptyAddress,
    ConnectFailed,
    Connected,
    FrameReadFailed,
    Disconnected,
    Detection(DetectionStatus),
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "not connected"),
            SessionStatus::EmptyAddress => write!(f, "stream address is empty"),
            SessionStatus::ConnectFailed => write!(f, "cannot connect to video stream"),
            SessionStatus::Connected => write!(f, "connected"),
            SessionStatus::FrameReadFailed => write!(f, "failed to read frame"),
            SessionStatus::Disconnected => write!(f, "disconnected"),
            SessionStatus::Detection(status) => write!(f, "{status}"),
        }
    }
}

#[derive(Debug)]
pub enum TickOutcome {
    /// A frame was read. In path mode it has already been annotated and
    /// `detection` is set.
    Frame {
        frame: Frame,
        detection: Option<PathDetection>,
    },
    ReadFailed(StreamError),
}

/// Timer-driven monitoring loop without a UI.
///
/// Owns one stream source at a time. The caller drives it by calling
/// [`tick`](Self::tick) at a fixed interval and renders what comes back.
pub struct MonitorSession {
    source: Box<dyn StreamSource>,
    detector: Box<dyn PathDetector>,
    logger: Box<dyn PipelineLogger>,
    mode: Mode,
    status: SessionStatus,
    info: Option<StreamInfo>,
}

impl MonitorSession {
    pub fn new(
        source: Box<dyn StreamSource>,
        detector: Box<dyn PathDetector>,
        mode: Mode,
    ) -> Self {
        Self {
            source,
            detector,
            logger: Box::new(NullPipelineLogger),
            mode,
            status: SessionStatus::Idle,
            info: None,
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Swaps the stream source. An open session is stopped first.
    pub fn set_source(&mut self, source: Box<dyn StreamSource>) {
        self.stop();
        self.source = source;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Takes effect from the next tick.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.info.is_some() && self.source.is_opened()
    }

    /// Details of the open stream, if running.
    pub fn stream_info(&self) -> Option<&StreamInfo> {
        self.info.as_ref()
    }

    pub fn logger(&self) -> &dyn PipelineLogger {
        self.logger.as_ref()
    }

    /// Opens `address` and starts ticking. A running session is restarted
    /// on the new address.
    pub fn start(&mut self, address: &str) -> SessionStatus {
        let address = address.trim();
        if address.is_empty() {
            return self.set_status(SessionStatus::EmptyAddress);
        }
        if self.is_running() {
            self.stop();
        }

        match self.source.open(address) {
            Ok(info) => {
                log::info!(
                    "Connected to {} ({}x{}, {:.1} fps)",
                    info.address,
                    info.width,
                    info.height,
                    info.fps
                );
                self.info = Some(info);
                self.set_status(SessionStatus::Connected)
            }
            Err(e) => {
                log::warn!("Cannot connect to {address}: {e}");
                self.source.close();
                self.set_status(SessionStatus::ConnectFailed)
            }
        }
    }

    /// Reads one frame and, in path mode, runs detection on it.
    ///
    /// Returns `None` without touching the source when not running. A read
    /// failure leaves the session running so the next tick tries again.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if !self.is_running() {
            return None;
        }

        let read_start = Instant::now();
        let mut frame = match self.source.read_next() {
            Ok(frame) => frame,
            Err(e) => {
                log::debug!("Frame read failed: {e}");
                self.logger.read_failure();
                self.status = SessionStatus::FrameReadFailed;
                return Some(TickOutcome::ReadFailed(e));
            }
        };
        self.logger.timing("read", elapsed_ms(read_start));

        let detection = match self.mode {
            Mode::View => {
                self.status = SessionStatus::Connected;
                None
            }
            Mode::Path => {
                let detect_start = Instant::now();
                let detection = self.detector.detect(&mut frame);
                self.logger.timing("detect", elapsed_ms(detect_start));
                if let Some(estimate) = &detection.estimate {
                    self.logger.metric("contour_area", estimate.area);
                }
                self.status = SessionStatus::Detection(detection.status);
                Some(detection)
            }
        };

        self.logger.frame(frame.index());
        Some(TickOutcome::Frame { frame, detection })
    }

    /// Closes the source. Safe to call repeatedly.
    pub fn stop(&mut self) -> SessionStatus {
        if self.info.take().is_some() {
            log::info!("Disconnected");
        }
        self.source.close();
        self.set_status(SessionStatus::Disconnected)
    }

    fn set_status(&mut self, status: SessionStatus) -> SessionStatus {
        self.status = status;
        self.logger.info(&status.to_string());
        status
    }
}

impl Drop for MonitorSession {
    fn drop(&mut self) {
        self.source.close();
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::infrastructure::contour_path_detector::ContourPathDetector;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// In-memory source that replays a fixed script of reads.
    struct ScriptedSource {
        reachable: bool,
        script: VecDeque<Result<Frame, StreamError>>,
        opened: bool,
        opens: Arc<AtomicUsize>,
        reads: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn new(reachable: bool, script: Vec<Result<Frame, StreamError>>) -> Self {
            Self {
                reachable,
                script: script.into(),
                opened: false,
                opens: Arc::new(AtomicUsize::new(0)),
                reads: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl StreamSource for ScriptedSource {
        fn open(&mut self, address: &str) -> Result<StreamInfo, StreamError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if !self.reachable {
                return Err(StreamError::Open {
                    address: address.to_string(),
                    reason: "unreachable".into(),
                });
            }
            self.opened = true;
            Ok(StreamInfo {
                width: 64,
                height: 48,
                fps: 25.0,
                address: address.to_string(),
            })
        }

        fn read_next(&mut self) -> Result<Frame, StreamError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if !self.opened {
                return Err(StreamError::NotOpened);
            }
            self.script.pop_front().unwrap_or(Err(StreamError::EndOfStream))
        }

        fn close(&mut self) {
            self.opened = false;
        }

        fn is_opened(&self) -> bool {
            self.opened
        }
    }

    fn dark_bar_frame(index: usize) -> Frame {
        let mut frame = Frame::filled(64, 48, [200, 200, 200], index);
        let width = frame.width();
        let data = frame.data_mut();
        for y in 0..48u32 {
            for x in 28..36u32 {
                let offset = ((y * width + x) * 3) as usize;
                data[offset..offset + 3].copy_from_slice(&[20, 20, 20]);
            }
        }
        frame
    }

    fn session_with(source: ScriptedSource, mode: Mode) -> MonitorSession {
        MonitorSession::new(
            Box::new(source),
            Box::new(ContourPathDetector::default()),
            mode,
        )
    }

    #[test]
    fn test_empty_address_never_opens_source() {
        let source = ScriptedSource::new(true, vec![]);
        let opens = source.opens.clone();
        let mut session = session_with(source, Mode::Path);

        assert_eq!(session.start("   "), SessionStatus::EmptyAddress);
        assert_eq!(session.status().to_string(), "stream address is empty");
        assert_eq!(opens.load(Ordering::SeqCst), 0);
        assert!(!session.is_running());
        assert!(session.tick().is_none());
    }

    #[test]
    fn test_unreachable_source_reports_connect_failure() {
        let source = ScriptedSource::new(false, vec![]);
        let reads = source.reads.clone();
        let mut session = session_with(source, Mode::Path);

        let status = session.start("http://192.168.4.1:81/stream");
        assert_eq!(status.to_string(), "cannot connect to video stream");
        assert!(!session.is_running());
        assert!(session.tick().is_none());
        assert_eq!(reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_start_trims_address() {
        let mut session = session_with(ScriptedSource::new(true, vec![]), Mode::View);
        assert_eq!(session.start("  cam  "), SessionStatus::Connected);
        assert_eq!(session.stream_info().unwrap().address, "cam");
    }

    #[test]
    fn test_view_mode_passes_frames_through() {
        let frame = dark_bar_frame(0);
        let source = ScriptedSource::new(true, vec![Ok(frame.clone())]);
        let mut session = session_with(source, Mode::View);
        session.start("cam");

        match session.tick() {
            Some(TickOutcome::Frame { frame: out, detection }) => {
                assert_eq!(out, frame);
                assert!(detection.is_none());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(session.status(), SessionStatus::Connected);
    }

    #[test]
    fn test_path_mode_annotates_and_reports_detection() {
        let frame = dark_bar_frame(3);
        let source = ScriptedSource::new(true, vec![Ok(frame.clone())]);
        let mut session = session_with(source, Mode::Path);
        session.start("cam");

        match session.tick() {
            Some(TickOutcome::Frame { frame: out, detection }) => {
                assert_eq!(out.index(), 3);
                assert_ne!(out, frame);
                assert_eq!(detection.unwrap().status, DetectionStatus::PathOk);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(session.status().to_string(), "path OK");
    }

    #[test]
    fn test_path_mode_without_path_reports_no_path() {
        let frame = Frame::filled(64, 48, [200, 200, 200], 0);
        let source = ScriptedSource::new(true, vec![Ok(frame)]);
        let mut session = session_with(source, Mode::Path);
        session.start("cam");
        session.tick();
        assert_eq!(session.status().to_string(), "no path detected");
    }

    #[test]
    fn test_read_failure_keeps_session_running() {
        let source = ScriptedSource::new(
            true,
            vec![Err(StreamError::Read("glitch".into())), Ok(dark_bar_frame(1))],
        );
        let reads = source.reads.clone();
        let mut session = session_with(source, Mode::View);
        session.start("cam");

        assert!(matches!(
            session.tick(),
            Some(TickOutcome::ReadFailed(StreamError::Read(_)))
        ));
        assert_eq!(session.status().to_string(), "failed to read frame");
        assert!(session.is_running());

        assert!(matches!(session.tick(), Some(TickOutcome::Frame { .. })));
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut session = session_with(ScriptedSource::new(true, vec![]), Mode::Path);
        session.start("cam");
        assert_eq!(session.stop(), SessionStatus::Disconnected);
        assert_eq!(session.stop(), SessionStatus::Disconnected);
        assert_eq!(session.status().to_string(), "disconnected");
        assert!(!session.is_running());
        assert!(session.tick().is_none());
    }

    #[test]
    fn test_start_while_running_restarts() {
        let source = ScriptedSource::new(true, vec![]);
        let opens = source.opens.clone();
        let mut session = session_with(source, Mode::Path);
        session.start("first");
        session.start("second");
        assert_eq!(opens.load(Ordering::SeqCst), 2);
        assert!(session.is_running());
        assert_eq!(session.stream_info().unwrap().address, "second");
    }

    #[test]
    fn test_mode_switch_applies_on_next_tick() {
        let source = ScriptedSource::new(true, vec![Ok(dark_bar_frame(0)), Ok(dark_bar_frame(1))]);
        let mut session = session_with(source, Mode::View);
        session.start("cam");

        assert!(matches!(
            session.tick(),
            Some(TickOutcome::Frame { detection: None, .. })
        ));
        session.set_mode(Mode::Path);
        assert!(matches!(
            session.tick(),
            Some(TickOutcome::Frame { detection: Some(_), .. })
        ));
    }

    #[test]
    fn test_status_and_mode_display() {
        assert_eq!(SessionStatus::Idle.to_string(), "not connected");
        assert_eq!(SessionStatus::Connected.to_string(), "connected");
        assert_eq!(Mode::View.to_string(), "view");
        assert_eq!(Mode::default(), Mode::Path);
    }
}
