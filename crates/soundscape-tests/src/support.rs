//! Shared fixtures: an asset directory with generated WAV files.

use soundscape_audio::{
    AssetLoader, AudioBuffer, EngineConfig, FileAssetLoader, Mixer, Session, SoundscapeEngine,
};
use soundscape_core::{Pack, PackAssetResolver, Result};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// 16-bit mono PCM WAV holding a constant level.
pub fn wav(level: i16, frames: usize, sample_rate: u32) -> Vec<u8> {
    let data_len = (frames * 2) as u32;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for _ in 0..frames {
        out.extend_from_slice(&level.to_le_bytes());
    }
    out
}

/// Asset root with a WAV for every source of `pack`, laid out as
/// `audio/{pack}/{source}.wav`.
pub fn asset_dir(pack: Pack) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_pack(dir.path(), pack);
    dir
}

pub fn write_pack(root: &Path, pack: Pack) {
    let pack_dir = root.join("audio").join(pack.as_str());
    std::fs::create_dir_all(&pack_dir).unwrap();
    for source in pack.sources() {
        std::fs::write(
            pack_dir.join(format!("{}.wav", source.id)),
            wav(8000, 4800, 48000),
        )
        .unwrap();
    }
}

pub fn resolver() -> PackAssetResolver {
    PackAssetResolver::new().with_extension("wav")
}

/// File loader that counts decodes.
pub struct CountingLoader {
    inner: FileAssetLoader,
    pub decodes: AtomicUsize,
}

impl CountingLoader {
    pub fn new(root: &Path) -> Self {
        Self {
            inner: FileAssetLoader::new(root),
            decodes: AtomicUsize::new(0),
        }
    }

    pub fn decodes(&self) -> usize {
        self.decodes.load(Ordering::SeqCst)
    }
}

impl AssetLoader for CountingLoader {
    fn load(&self, url: &str) -> Result<AudioBuffer> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        self.inner.load(url)
    }
}

pub fn test_config() -> EngineConfig {
    EngineConfig {
        gain_ramp_ms: 0.0,
        ..Default::default()
    }
}

/// Session over `root` with a counting loader.
pub fn session(root: &Path, config: &EngineConfig) -> (Session, Mixer, Arc<CountingLoader>) {
    let loader = Arc::new(CountingLoader::new(root));
    let (engine, mixer) = SoundscapeEngine::new(config, loader.clone(), Arc::new(resolver()));
    (Session::new(engine, config), mixer, loader)
}
