// Reads and decodes picked files off the UI thread.
// Visual: the window keeps responding while a big photo decodes; the picture
// pops in on a later frame.

use crate::capture::StillImage;
use crate::error::Error;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

pub type LoadResult = Result<StillImage, Error>;

pub struct ImageLoader {
    sender: Sender<LoadResult>,
    receiver: Receiver<LoadResult>,
    pending: usize,
}

impl ImageLoader {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver, pending: 0 }
    }

    /// Start decoding `path` on the rayon pool.
    pub fn request(&mut self, path: PathBuf) {
        log::info!("Loading {}", path.display());
        let sender = self.sender.clone();
        self.pending += 1;
        rayon::spawn(move || {
            let _ = sender.send(load_file(&path));
        });
    }

    /// A finished decode, if any. Never blocks.
    pub fn poll(&mut self) -> Option<LoadResult> {
        let result = self.receiver.try_recv().ok()?;
        self.pending = self.pending.saturating_sub(1);
        Some(result)
    }

    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn load_file(path: &Path) -> LoadResult {
    let bytes = std::fs::read(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
    StillImage::decode(&bytes)
}
