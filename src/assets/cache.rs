use crate::assets::decode::{DecodedImage, decode_payload};
use crate::foundation::error::CaptionResult;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Identity of an image source (URL, path, data URI or clipboard token).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SourceKey(String);

impl SourceKey {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared decoded bitmaps. The first successful decode for a key wins; later inserts for the
/// same key hand back the existing bitmap so every overlay sees identical pixels.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<SourceKey, Arc<DecodedImage>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &SourceKey) -> Option<Arc<DecodedImage>> {
        self.entries.get(key).cloned()
    }

    pub fn contains(&self, key: &SourceKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert unless the key is already populated; returns the bitmap now cached for `key`.
    pub fn insert(&mut self, key: SourceKey, image: DecodedImage) -> Arc<DecodedImage> {
        self.entries
            .entry(key)
            .or_insert_with(|| Arc::new(image))
            .clone()
    }

    /// Decode `bytes` for `key` unless a bitmap is already cached.
    pub fn get_or_decode(
        &mut self,
        key: &SourceKey,
        bytes: &[u8],
        mime: Option<&str>,
    ) -> CaptionResult<Arc<DecodedImage>> {
        if let Some(existing) = self.get(key) {
            return Ok(existing);
        }
        let decoded = decode_payload(bytes, mime)?;
        tracing::debug!(
            source = %key,
            width = decoded.width,
            height = decoded.height,
            "decoded image"
        );
        Ok(self.insert(key.clone(), decoded))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
