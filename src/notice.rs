// Short-lived status messages shown in the HUD bar.
// Visual: "NO ACTIVE CAMERA STREAM" flashes in the top bar for a few seconds
// instead of the app quitting.

use crate::error::Error;
use std::time::{Duration, Instant};

const SHOW_FOR: Duration = Duration::from_secs(4);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

pub struct Notice {
    pub level: Level,
    pub text: String,
    until: Instant,
}

#[derive(Default)]
pub struct Notices {
    current: Option<Notice>,
}

impl Notices {
    pub fn info(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::info!("{text}");
        self.show(Level::Info, text, Instant::now());
    }

    /// Report a recoverable failure: logged, then shown to the user.
    pub fn error(&mut self, err: &Error) {
        log::warn!("{err}");
        self.show(Level::Error, err.to_string(), Instant::now());
    }

    fn show(&mut self, level: Level, text: String, now: Instant) {
        self.current = Some(Notice { level, text, until: now + SHOW_FOR });
    }

    /// The message to draw right now, if it has not expired.
    pub fn current(&mut self, now: Instant) -> Option<&Notice> {
        if self.current.as_ref().is_some_and(|n| now >= n.until) {
            self.current = None;
        }
        self.current.as_ref()
    }
}
