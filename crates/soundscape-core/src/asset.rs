//! Asset resolution: `(pack, source id) -> asset URL`.

use std::collections::HashSet;

use crate::catalog::Pack;

/// Maps a catalog source to the URL of its audio asset.
///
/// Returning `None` means the asset is not available yet. That is an
/// expected condition during incremental content rollout, not an error.
pub trait AssetResolver: Send + Sync {
    fn resolve(&self, pack: Pack, source_id: &str) -> Option<String>;
}

impl<F> AssetResolver for F
where
    F: Fn(Pack, &str) -> Option<String> + Send + Sync,
{
    fn resolve(&self, pack: Pack, source_id: &str) -> Option<String> {
        self(pack, source_id)
    }
}

/// Resolver using the `/audio/{pack}/{source}.{ext}` layout.
#[derive(Debug, Clone)]
pub struct PackAssetResolver {
    base: String,
    extension: String,
    /// When set, only these `(pack, source id)` pairs resolve.
    available: Option<HashSet<(Pack, String)>>,
}

impl PackAssetResolver {
    pub fn new() -> Self {
        Self {
            base: "/audio".to_string(),
            extension: "mp3".to_string(),
            available: None,
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Restrict resolution to an explicit allow-list.
    pub fn with_available<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (Pack, S)>,
        S: Into<String>,
    {
        self.available = Some(
            entries
                .into_iter()
                .map(|(pack, id)| (pack, id.into()))
                .collect(),
        );
        self
    }

    /// Every URL this resolver can produce for a pack's catalog.
    pub fn pack_urls(&self, pack: Pack) -> Vec<String> {
        pack.sources()
            .iter()
            .filter_map(|s| self.resolve(pack, s.id))
            .collect()
    }
}

impl Default for PackAssetResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetResolver for PackAssetResolver {
    fn resolve(&self, pack: Pack, source_id: &str) -> Option<String> {
        pack.find(source_id)?;
        if let Some(available) = &self.available {
            if !available.contains(&(pack, source_id.to_string())) {
                return None;
            }
        }
        Some(format!(
            "{}/{}/{}.{}",
            self.base,
            pack.as_str(),
            source_id,
            self.extension
        ))
    }
}
