// One camera session: V turns it on, a snap (Space or V) ends it.
// Visual: while the session runs you see the live color preview; the moment
// you snap, the preview goes away and the grey photo is what stays.

use crate::camera::{CameraFeed, CameraStatus};
use crate::capture::{live_frame, render_preview, CapturePipeline, LiveFrame, Source};
use crate::error::Error;
use crate::frame::Frame;
use crate::mode::{ModeController, VideoToggle};
use crate::types::Placement;

pub struct CameraSession {
    feed: Option<CameraFeed>,
    preview: Frame,
    showing_preview: bool,
}

impl CameraSession {
    pub fn new(width: usize, height: usize) -> Self {
        Self { feed: None, preview: Frame::new(width, height), showing_preview: false }
    }

    /// V key. Turning the camera on starts `open`; turning it off takes the
    /// photo first, then releases the stream. Returns the capture result only
    /// when a photo was attempted.
    pub fn toggle(
        &mut self,
        modes: &mut ModeController,
        pipeline: &mut CapturePipeline,
        open: impl FnOnce() -> CameraFeed,
    ) -> Option<Result<Placement, Error>> {
        match modes.toggle_video() {
            VideoToggle::On => {
                self.feed = Some(open());
                None
            }
            VideoToggle::Off => {
                let shot = self.capture(pipeline);
                self.stop();
                Some(shot)
            }
        }
    }

    /// Space key. A successful snap ends the session so the photo is shown
    /// and a later V press starts a new session instead of shooting again.
    pub fn snap(
        &mut self,
        modes: &mut ModeController,
        pipeline: &mut CapturePipeline,
    ) -> Result<Placement, Error> {
        let placement = self.capture(pipeline)?;
        if modes.video_on() {
            modes.toggle_video();
        }
        self.stop();
        Ok(placement)
    }

    fn capture(&self, pipeline: &mut CapturePipeline) -> Result<Placement, Error> {
        let frame = live_frame(self.feed.as_ref())?;
        pipeline.capture(&Source::Live(frame))
    }

    /// Release the stream, even one still waiting for the device.
    pub fn stop(&mut self) {
        if let Some(feed) = self.feed.take() {
            feed.cancel();
        }
        self.showing_preview = false;
    }

    /// Next worker status. A failed or lost stream ends the session and puts
    /// the video toggle back to off.
    pub fn poll(&mut self, modes: &mut ModeController) -> Option<CameraStatus> {
        let status = self.feed.as_mut()?.poll()?;
        if matches!(status, CameraStatus::Failed(_) | CameraStatus::Lost(_)) {
            modes.video_failed();
            self.stop();
        }
        Some(status)
    }

    /// Stream granted and delivering frames.
    pub fn is_live(&self) -> bool {
        self.feed.as_ref().is_some_and(CameraFeed::is_active)
    }

    /// Redraw the color preview from the newest frame, if there is one.
    pub fn refresh_preview(&mut self) {
        let Some(Ok(pixels)) = self.feed.as_ref().map(CameraFeed::latest) else {
            return;
        };
        match render_preview(&mut self.preview, &LiveFrame::new(pixels)) {
            Ok(()) => self.showing_preview = true,
            Err(e) => log::debug!("preview skipped: {e}"),
        }
    }

    /// What goes under the ink: the live preview while it runs, otherwise the
    /// captured picture.
    pub fn base<'a>(&'a self, pipeline: &'a CapturePipeline) -> &'a Frame {
        if self.showing_preview { &self.preview } else { pipeline.frame() }
    }
}
