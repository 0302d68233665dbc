// Opens the camera on its own thread and keeps the newest frame around.
// Visual expectation: after pressing V, a moment later the live picture
// replaces the portrait; pressing V again freezes it into a grey photo.

use crate::error::Error;
use crate::types::PixelBuffer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

// Bring in nokhwa types for camera control.
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

/// Anything that can hand out RGBA frames until told to stop.
pub trait StreamSource {
    /// Resolution actually being delivered.
    fn resolution(&self) -> (u32, u32);
    /// Block until the next frame is ready.
    fn next_frame(&mut self) -> Result<PixelBuffer, Error>;
    /// Release the device. Called exactly once by the worker.
    fn stop(&mut self);
}

// A small wrapper around nokhwa::Camera so the worker loop stays clean.
pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
}

impl CameraCapture {
    /// Open camera `index` near the requested resolution and start streaming.
    /// Any failure here (no device, permission refused, busy) is reported as
    /// `MediaAccessDenied`.
    pub fn new(index: u32, width: u32, height: u32) -> Result<Self, Error> {
        let idx = CameraIndex::Index(index);

        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            30,                // target FPS
        );

        // Ask for RGB frames, closest to our request.
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(idx, req)
            .map_err(|e| Error::MediaAccessDenied(format!("Create camera: {e}")))?;

        cam.open_stream()
            .map_err(|e| Error::MediaAccessDenied(format!("Open stream: {e}")))?;

        // The actual stream might choose a slightly different resolution.
        let actual = cam.resolution();

        Ok(Self { cam, width: actual.width(), height: actual.height() })
    }
}

impl StreamSource for CameraCapture {
    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn next_frame(&mut self) -> Result<PixelBuffer, Error> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;

        let rgb_img = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

        // Expand RGB to opaque RGBA for the frames.
        let (w, h) = rgb_img.dimensions();
        let mut data = Vec::with_capacity((w as usize) * (h as usize) * 4);
        for pixel in rgb_img.pixels() {
            data.extend_from_slice(&[pixel[0], pixel[1], pixel[2], 255]);
        }

        Ok(PixelBuffer { width: w as usize, height: h as usize, data })
    }

    fn stop(&mut self) {
        if let Err(e) = self.cam.stop_stream() {
            log::warn!("Failed to stop camera stream: {e}");
        }
    }
}

/// Shared "never mind" flag between the UI thread and the camera worker.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub enum CameraStatus {
    /// Stream is live; frames will start showing up.
    Ready { width: u32, height: u32 },
    /// The camera could not be opened.
    Failed(Error),
    /// The stream broke after it was running.
    Lost(Error),
}

/// Handle to a camera worker. Dropping it cancels the worker.
pub struct CameraFeed {
    token: CancelToken,
    latest: Arc<Mutex<Option<PixelBuffer>>>,
    events: Receiver<CameraStatus>,
    active: bool,
}

impl CameraFeed {
    /// Start opening the real camera in the background.
    pub fn request(index: u32, width: u32, height: u32) -> Self {
        log::info!("Requesting camera {index} at {width}x{height}");
        Self::spawn(move || CameraCapture::new(index, width, height))
    }

    /// Run `open` on a worker thread. The source is created, used and stopped
    /// on that thread only.
    pub fn spawn<S, F>(open: F) -> Self
    where
        S: StreamSource + 'static,
        F: FnOnce() -> Result<S, Error> + Send + 'static,
    {
        let token = CancelToken::default();
        let latest = Arc::new(Mutex::new(None));
        let (sender, events) = mpsc::channel();

        let worker_token = token.clone();
        let worker_latest = Arc::clone(&latest);
        thread::spawn(move || run_worker(open, worker_token, worker_latest, sender));

        Self { token, latest, events, active: false }
    }

    /// Next status change from the worker, if any. Never blocks.
    pub fn poll(&mut self) -> Option<CameraStatus> {
        let status = self.events.try_recv().ok()?;
        self.active = matches!(status, CameraStatus::Ready { .. });
        Some(status)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Copy of the newest frame.
    pub fn latest(&self) -> Result<PixelBuffer, Error> {
        if !self.active {
            return Err(Error::NoActiveStream);
        }
        let slot = self
            .latest
            .lock()
            .map_err(|_| Error::CameraFrame("frame slot poisoned".into()))?;
        slot.clone().ok_or(Error::NoActiveStream)
    }

    /// Tell the worker to stop (or to discard the stream if it is still opening).
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for CameraFeed {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn run_worker<S, F>(
    open: F,
    token: CancelToken,
    latest: Arc<Mutex<Option<PixelBuffer>>>,
    events: Sender<CameraStatus>,
) where
    S: StreamSource,
    F: FnOnce() -> Result<S, Error>,
{
    let mut source = match open() {
        Ok(source) => source,
        Err(e) => {
            log::warn!("Camera unavailable: {e}");
            let _ = events.send(CameraStatus::Failed(e));
            return;
        }
    };

    // Switched off while we were waiting for the device: do not attach.
    if token.is_cancelled() {
        log::info!("Camera granted after it was switched off; discarding stream");
        source.stop();
        return;
    }

    let (width, height) = source.resolution();
    log::info!("Camera streaming at {width}x{height}");
    let _ = events.send(CameraStatus::Ready { width, height });

    // The token is only seen between frames. nokhwa's `frame()` has no
    // timeout, so a stalled device delays the stop until it returns; the UI
    // never waits on this because dropping the feed only flips the token.
    while !token.is_cancelled() {
        match source.next_frame() {
            Ok(frame) => {
                if let Ok(mut slot) = latest.lock() {
                    *slot = Some(frame);
                }
            }
            Err(e) => {
                log::warn!("Camera stream lost: {e}");
                let _ = events.send(CameraStatus::Lost(e));
                break;
            }
        }
    }

    source.stop();
    log::debug!("camera worker finished");
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::Rgba;
    use std::time::{Duration, Instant};

    pub(crate) struct FakeSource {
        stopped: Arc<AtomicBool>,
        fail_after: Option<usize>,
        served: usize,
        color: Rgba,
        /// When set, each frame waits for a message here first.
        stall: Option<(Sender<()>, Receiver<()>)>,
    }

    impl FakeSource {
        pub(crate) fn new(stopped: &Arc<AtomicBool>) -> Self {
            Self {
                stopped: Arc::clone(stopped),
                fail_after: None,
                served: 0,
                color: Rgba::rgb(10, 20, 30),
                stall: None,
            }
        }

        pub(crate) fn with_color(mut self, color: Rgba) -> Self {
            self.color = color;
            self
        }
    }

    impl StreamSource for FakeSource {
        fn resolution(&self) -> (u32, u32) {
            (4, 2)
        }

        fn next_frame(&mut self) -> Result<PixelBuffer, Error> {
            if let Some((entered, release)) = &self.stall {
                let _ = entered.send(());
                let _ = release.recv();
            }
            thread::sleep(Duration::from_millis(1));
            if self.fail_after.is_some_and(|n| self.served >= n) {
                return Err(Error::CameraFrame("unplugged".into()));
            }
            self.served += 1;
            Ok(PixelBuffer::filled(4, 2, self.color))
        }

        fn stop(&mut self) {
            self.stopped.store(true, Ordering::SeqCst);
        }
    }

    pub(crate) fn eventually(mut check: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if check() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }

    fn next_status(feed: &mut CameraFeed) -> Option<CameraStatus> {
        let mut status = None;
        eventually(|| {
            status = feed.poll();
            status.is_some()
        });
        status
    }

    #[test]
    fn frames_flow_after_ready() {
        let stopped = Arc::new(AtomicBool::new(false));
        let fake = FakeSource::new(&stopped);
        let mut feed = CameraFeed::spawn(move || Ok(fake));

        assert!(matches!(
            next_status(&mut feed),
            Some(CameraStatus::Ready { width: 4, height: 2 })
        ));
        assert!(feed.is_active());
        assert!(eventually(|| feed.latest().is_ok()));
        let frame = feed.latest().unwrap();
        assert_eq!((frame.width, frame.height), (4, 2));
        assert_eq!(frame.pixel(3, 1), Rgba::rgb(10, 20, 30));

        drop(feed);
        assert!(eventually(|| stopped.load(Ordering::SeqCst)));
    }

    #[test]
    fn cancel_before_grant_discards_the_stream() {
        let stopped = Arc::new(AtomicBool::new(false));
        let fake = FakeSource::new(&stopped);
        let (grant, granted) = mpsc::channel::<()>();
        let mut feed = CameraFeed::spawn(move || {
            let _ = granted.recv();
            Ok(fake)
        });

        // user switches the camera off before the device answers
        feed.cancel();
        grant.send(()).unwrap();

        assert!(eventually(|| stopped.load(Ordering::SeqCst)));
        assert!(feed.poll().is_none());
        assert!(!feed.is_active());
        assert!(matches!(feed.latest(), Err(Error::NoActiveStream)));
    }

    #[test]
    fn open_failure_is_reported() {
        let mut feed = CameraFeed::spawn(|| {
            Err::<FakeSource, _>(Error::MediaAccessDenied("permission refused".into()))
        });
        assert!(matches!(
            next_status(&mut feed),
            Some(CameraStatus::Failed(Error::MediaAccessDenied(_)))
        ));
        assert!(!feed.is_active());
    }

    #[test]
    fn broken_stream_is_reported_and_stopped() {
        let stopped = Arc::new(AtomicBool::new(false));
        let mut fake = FakeSource::new(&stopped);
        fake.fail_after = Some(2);
        let mut feed = CameraFeed::spawn(move || Ok(fake));

        assert!(matches!(next_status(&mut feed), Some(CameraStatus::Ready { .. })));
        assert!(matches!(next_status(&mut feed), Some(CameraStatus::Lost(_))));
        assert!(!feed.is_active());
        assert!(matches!(feed.latest(), Err(Error::NoActiveStream)));
        assert!(eventually(|| stopped.load(Ordering::SeqCst)));
    }

    #[test]
    fn nothing_before_the_first_frame() {
        let (_hold, never) = mpsc::channel::<()>();
        let feed = CameraFeed::spawn(move || {
            let _ = never.recv();
            Err::<FakeSource, _>(Error::MediaAccessDenied("gone".into()))
        });
        assert!(matches!(feed.latest(), Err(Error::NoActiveStream)));
    }

    #[test]
    fn cancel_during_a_stalled_frame_stops_once_it_returns() {
        let stopped = Arc::new(AtomicBool::new(false));
        let (entered_tx, entered) = mpsc::channel();
        let (release, release_rx) = mpsc::channel();
        let mut fake = FakeSource::new(&stopped);
        fake.stall = Some((entered_tx, release_rx));
        let mut feed = CameraFeed::spawn(move || Ok(fake));

        assert!(matches!(next_status(&mut feed), Some(CameraStatus::Ready { .. })));
        // worker is now stuck inside the device read
        entered.recv().unwrap();
        feed.cancel();
        thread::sleep(Duration::from_millis(20));
        assert!(!stopped.load(Ordering::SeqCst));

        release.send(()).unwrap();
        assert!(eventually(|| stopped.load(Ordering::SeqCst)));
    }
}
