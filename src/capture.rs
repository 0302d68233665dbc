// Load -> fit -> draw -> grayscale, into the image frame.
// Visual: whatever you load or snap shows up centered and black & white
// under your ink.

use crate::camera::CameraFeed;
use crate::error::Error;
use crate::fit::fit;
use crate::frame::Frame;
use crate::gray::grayscale;
use crate::types::{PixelBuffer, Placement};

/// A decoded picture from disk.
pub struct StillImage {
    pixels: PixelBuffer,
}

impl StillImage {
    /// Decode png/jpeg/gif/bmp/webp/... bytes into RGBA.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let img = image::load_from_memory(bytes).map_err(|e| Error::Decode(e.to_string()))?;
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        Ok(Self {
            pixels: PixelBuffer { width: w as usize, height: h as usize, data: rgba.into_raw() },
        })
    }
}

/// The camera's newest frame at the moment of capture.
pub struct LiveFrame {
    pixels: PixelBuffer,
}

impl LiveFrame {
    pub fn new(pixels: PixelBuffer) -> Self {
        Self { pixels }
    }
}

pub enum Source {
    Still(StillImage),
    Live(LiveFrame),
}

impl Source {
    pub fn pixels(&self) -> &PixelBuffer {
        match self {
            Source::Still(s) => &s.pixels,
            Source::Live(l) => &l.pixels,
        }
    }

    pub fn natural_size(&self) -> (usize, usize) {
        let p = self.pixels();
        (p.width, p.height)
    }
}

/// Grab the newest camera frame, or `NoActiveStream` when the camera is off
/// or has not produced anything yet.
pub fn live_frame(feed: Option<&CameraFeed>) -> Result<LiveFrame, Error> {
    let feed = feed.ok_or(Error::NoActiveStream)?;
    Ok(LiveFrame::new(feed.latest()?))
}

/// Validate the bitmap and work out where it goes, before anything is drawn.
fn place(frame: &Frame, pixels: &PixelBuffer) -> Result<Placement, Error> {
    let placement = fit(
        pixels.width as f32,
        pixels.height as f32,
        frame.width() as f32,
        frame.height() as f32,
    )?;
    if pixels.data.len() != pixels.width * pixels.height * 4 {
        return Err(Error::SizeMismatch {
            width: pixels.width,
            height: pixels.height,
            expected_width: pixels.width,
            expected_height: pixels.data.len() / 4 / pixels.width,
        });
    }
    Ok(placement)
}

/// Owns the image frame; nothing else writes to it.
pub struct CapturePipeline {
    frame: Frame,
}

impl CapturePipeline {
    pub fn new(width: usize, height: usize) -> Self {
        Self { frame: Frame::new(width, height) }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Replace the image frame with `source`, fitted and grayscaled.
    /// On error the previous picture stays as it was.
    pub fn capture(&mut self, source: &Source) -> Result<Placement, Error> {
        let pixels = source.pixels();
        let placement = place(&self.frame, pixels)?;

        self.frame.clear();
        self.frame.draw_bitmap(pixels, placement)?;

        let mut buf = self.frame.read_pixels();
        grayscale(&mut buf);
        self.frame.write_pixels(&buf)?;

        let (w, h) = source.natural_size();
        log::debug!(
            "captured {w}x{h} {} at {:.1},{:.1} size {:.1}x{:.1}",
            if matches!(source, Source::Live(_)) { "camera frame" } else { "image" },
            placement.offset_x,
            placement.offset_y,
            placement.draw_width,
            placement.draw_height
        );
        Ok(placement)
    }

    /// Decode then capture; a bad file never clears the current picture.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<Placement, Error> {
        let still = StillImage::decode(bytes)?;
        self.capture(&Source::Still(still))
    }
}

/// Live camera preview: fitted like a capture but left in color.
/// Visual: while the camera is on, you see yourself where the portrait goes.
pub fn render_preview(frame: &mut Frame, live: &LiveFrame) -> Result<(), Error> {
    let placement = place(frame, &live.pixels)?;
    frame.clear();
    frame.draw_bitmap(&live.pixels, placement)
}
