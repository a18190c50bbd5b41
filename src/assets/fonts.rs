use crate::foundation::error::{CaptionError, CaptionResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// A loaded font face, ready for shaping and glyph rendering.
#[derive(Clone)]
pub struct FontFace {
    /// Registry-unique id, used for measurement caches.
    pub id: u32,
    pub family: String,
    pub weight: u16,
    pub bytes: Arc<Vec<u8>>,
    pub data: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("id", &self.id)
            .field("family", &self.family)
            .field("weight", &self.weight)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct FaceKey {
    family: String,
    weight: u16,
}

impl FaceKey {
    fn new(family: &str, weight: u16) -> Self {
        Self {
            family: normalize_family(family),
            weight,
        }
    }
}

fn normalize_family(family: &str) -> String {
    family
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_ascii_lowercase()
}

#[derive(Clone, Debug)]
enum FaceState {
    Pending { since: Duration },
    Ready(Arc<FontFace>),
    Failed,
}

/// Outcome of looking up a face for drawing.
#[derive(Clone, Debug)]
pub enum FontResolution {
    /// The requested family is available (possibly at the nearest weight).
    Ready(Arc<FontFace>),
    /// Still inside the settle window; try again at `until`.
    Waiting { until: Duration },
    /// The requested family never became ready; this substitute should be used.
    Fallback(Arc<FontFace>),
    /// No face is registered at all.
    Unavailable,
}

impl FontResolution {
    /// The face to draw with right now, ignoring the settle window.
    pub fn face(&self) -> Option<&Arc<FontFace>> {
        match self {
            Self::Ready(f) | Self::Fallback(f) => Some(f),
            Self::Waiting { .. } | Self::Unavailable => None,
        }
    }
}

/// Registry of font faces keyed by (family, weight).
///
/// Font bytes are supplied by the host. A family that is requested but not provided within the
/// settle timeout silently degrades to the fallback chain.
#[derive(Debug)]
pub struct FontBook {
    faces: BTreeMap<FaceKey, FaceState>,
    fallbacks: Vec<String>,
    settle: Duration,
    next_id: u32,
}

impl FontBook {
    pub fn new(fallbacks: Vec<String>, settle: Duration) -> Self {
        Self {
            faces: BTreeMap::new(),
            fallbacks,
            settle,
            next_id: 0,
        }
    }

    /// Note that `family`/`weight` is wanted. Returns `true` if the host should fetch it.
    pub fn request(&mut self, family: &str, weight: u16, now: Duration) -> bool {
        let key = FaceKey::new(family, weight);
        if self.faces.contains_key(&key) || self.ready_family(&key.family, weight).is_some() {
            return false;
        }
        tracing::debug!(family, weight, "font requested");
        self.faces.insert(key, FaceState::Pending { since: now });
        true
    }

    /// Register font bytes for `family`/`weight`.
    pub fn provide(&mut self, family: &str, weight: u16, bytes: Vec<u8>) -> CaptionResult<()> {
        let key = FaceKey::new(family, weight);
        if !looks_like_sfnt(&bytes) {
            self.faces.insert(key, FaceState::Failed);
            return Err(CaptionError::decode(format!(
                "font data for \"{family}\" is not a TrueType/OpenType face"
            )));
        }
        let bytes = Arc::new(bytes);
        let data = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::new(bytes.clone()), 0);
        let face = FontFace {
            id: self.next_id,
            family: family.trim().to_owned(),
            weight,
            bytes,
            data,
        };
        self.next_id += 1;
        tracing::debug!(family, weight, id = face.id, "font ready");
        self.faces.insert(key, FaceState::Ready(Arc::new(face)));
        Ok(())
    }

    /// Mark a requested face as never arriving.
    pub fn fail(&mut self, family: &str, weight: u16) {
        tracing::debug!(family, weight, "font failed to load");
        self.faces.insert(FaceKey::new(family, weight), FaceState::Failed);
    }

    pub fn resolve(&self, family: &str, weight: u16, now: Duration) -> FontResolution {
        let key = FaceKey::new(family, weight);
        if let Some(face) = self.ready_family(&key.family, weight) {
            return FontResolution::Ready(face);
        }
        if let Some(FaceState::Pending { since }) = self.faces.get(&key) {
            let until = *since + self.settle;
            if now < until {
                return FontResolution::Waiting { until };
            }
        }
        match self.fallback_face(weight) {
            Some(face) => {
                tracing::trace!(family, substitute = %face.family, "using fallback font");
                FontResolution::Fallback(face)
            }
            None => FontResolution::Unavailable,
        }
    }

    /// First face along the fallback chain, then any registered face.
    pub fn fallback_face(&self, weight: u16) -> Option<Arc<FontFace>> {
        self.fallbacks
            .iter()
            .find_map(|f| self.ready_family(&normalize_family(f), weight))
            .or_else(|| {
                self.faces.values().find_map(|s| match s {
                    FaceState::Ready(f) => Some(f.clone()),
                    _ => None,
                })
            })
    }

    /// Latest settle deadline among `faces` that are still waiting, if any.
    pub fn settle_deadline<'a>(
        &self,
        faces: impl IntoIterator<Item = (&'a str, u16)>,
        now: Duration,
    ) -> Option<Duration> {
        faces
            .into_iter()
            .filter_map(|(family, weight)| match self.resolve(family, weight, now) {
                FontResolution::Waiting { until } => Some(until),
                _ => None,
            })
            .max()
    }

    /// Nearest-weight ready face of a normalised family.
    fn ready_family(&self, family: &str, weight: u16) -> Option<Arc<FontFace>> {
        self.faces
            .iter()
            .filter(|(k, _)| k.family == family)
            .filter_map(|(k, s)| match s {
                FaceState::Ready(f) => Some((k.weight.abs_diff(weight), f)),
                _ => None,
            })
            .min_by_key(|(d, _)| *d)
            .map(|(_, f)| f.clone())
    }
}

fn looks_like_sfnt(bytes: &[u8]) -> bool {
    matches!(
        bytes.get(0..4),
        Some([0x00, 0x01, 0x00, 0x00]) | Some(b"OTTO") | Some(b"true") | Some(b"ttcf")
    )
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
