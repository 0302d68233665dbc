// One error type for the whole app.
// Every variant states *where* things went wrong; the I/O ones end up as a
// HUD notice instead of closing the window.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Creating the window failed
    #[error("Window init error: {0}")]
    WindowInit(String),

    /// Updating the window buffer failed
    #[error("Window update error: {0}")]
    WindowUpdate(String),

    /// A width/height that must be positive was zero, negative or NaN
    #[error("invalid dimension: {what} = {value}")]
    InvalidDimension { what: &'static str, value: f32 },

    /// A pixel buffer written into a frame had the wrong size
    #[error("buffer is {width}x{height}, frame is {expected_width}x{expected_height}")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    /// Picked bytes are not an image we can read
    #[error("could not decode image: {0}")]
    Decode(String),

    /// Reading the picked file failed
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Capture requested while the camera is off (or has not delivered a frame yet)
    #[error("no active camera stream")]
    NoActiveStream,

    /// Opening/starting the camera failed
    #[error("camera unavailable: {0}")]
    MediaAccessDenied(String),

    /// Grabbing/decoding a frame failed
    #[error("Camera frame error: {0}")]
    CameraFrame(String),
}
