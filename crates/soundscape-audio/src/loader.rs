//! Asset loading: turning an asset URL into a decoded buffer.

use crate::buffer::{decode, AudioBuffer};
use soundscape_core::{Result, SoundscapeError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fetches and decodes one asset. Called from the blocking pool, so
/// implementations may do synchronous I/O.
pub trait AssetLoader: Send + Sync + 'static {
    fn load(&self, url: &str) -> Result<AudioBuffer>;
}

/// Loads asset URLs as paths below a root directory.
///
/// `/audio/combat/cmb-fire.mp3` with root `assets` reads
/// `assets/audio/combat/cmb-fire.mp3`.
#[derive(Debug, Clone)]
pub struct FileAssetLoader {
    root: PathBuf,
}

impl FileAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for an asset URL.
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.root.join(url.trim_start_matches('/'))
    }
}

impl AssetLoader for FileAssetLoader {
    fn load(&self, url: &str) -> Result<AudioBuffer> {
        let path = self.path_for(url);
        debug!(url = %url, path = %path.display(), "Reading asset");
        let data = std::fs::read(&path).map_err(|e| SoundscapeError::load(url, e))?;
        let extension = path.extension().and_then(|e| e.to_str());
        decode(data, extension).map_err(|e| SoundscapeError::load(url, e))
    }
}
