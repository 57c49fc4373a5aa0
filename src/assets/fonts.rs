//! Font catalogue.
//!
//! A [`FontBook`] owns the font files available to the renderer and answers "which face draws
//! family F at weight W". Family and weight are read from the font tables through fontique, the
//! same collection parley shapes with, so the names a layer asks for match what the shaper sees.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{LayrError, LayrResult};

/// Generic CSS families that always resolve to the book's default family.
const GENERIC_FAMILIES: &[&str] = &[
    "sans-serif",
    "serif",
    "system-ui",
    "ui-sans-serif",
    "monospace",
    "cursive",
    "fantasy",
];

/// One face inside a registered font file.
#[derive(Debug, Clone)]
pub struct FontFace {
    /// Family name as reported by the font.
    pub family: String,
    /// `wght` class, 100..=900.
    pub weight: u16,
    /// Rasterizer handle over the file bytes.
    pub(crate) data: vello_cpu::peniko::FontData,
}

/// Face chosen for a layer, with a flag telling whether the requested family was missing.
#[derive(Debug, Clone)]
pub struct ResolvedFace {
    pub face: Arc<FontFace>,
    pub fell_back: bool,
}

/// Immutable-after-build set of font faces plus the default family.
#[derive(Debug, Clone, Default)]
pub struct FontBook {
    files: Vec<Arc<Vec<u8>>>,
    faces: Vec<Arc<FontFace>>,
    default_family: Option<String>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every face found in `bytes` (TTF, OTF or a collection). Returns the face count.
    pub fn add_font_bytes(&mut self, bytes: Vec<u8>) -> LayrResult<usize> {
        let bytes = Arc::new(bytes);
        let mut scratch = parley::FontContext::default();
        let families = scratch
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.as_ref().clone()), None);

        let blob = vello_cpu::peniko::Blob::from(bytes.as_ref().clone());
        let mut added = 0usize;
        for (family_id, infos) in families {
            let Some(family) = scratch.collection.family_name(family_id) else {
                continue;
            };
            let family = family.to_string();
            for info in infos {
                let weight = info.weight().value().round().clamp(1.0, 1000.0) as u16;
                let index = info.index();
                self.faces.push(Arc::new(FontFace {
                    family: family.clone(),
                    weight,
                    data: vello_cpu::peniko::FontData::new(blob.clone(), index),
                }));
                added += 1;
            }
        }

        if added == 0 {
            return Err(LayrError::font("no font faces found in font data"));
        }
        self.files.push(bytes);
        Ok(added)
    }

    /// Register a font file from disk.
    pub fn add_font_file(&mut self, path: &Path) -> LayrResult<usize> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font file {}", path.display()))?;
        self.add_font_bytes(bytes)
            .map_err(|e| LayrError::font(format!("{}: {e}", path.display())))
    }

    /// Register every `.ttf`, `.otf`, `.ttc` and `.otc` file directly inside `dir`.
    ///
    /// Files that fail to parse are skipped with a warning. Returns the number of faces added.
    #[tracing::instrument(skip(self), fields(dir = %dir.display()))]
    pub fn load_dir(&mut self, dir: &Path) -> LayrResult<usize> {
        let mut paths = std::fs::read_dir(dir)
            .with_context(|| format!("read font dir {}", dir.display()))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| {
                        matches!(
                            e.to_ascii_lowercase().as_str(),
                            "ttf" | "otf" | "ttc" | "otc"
                        )
                    })
                    .unwrap_or(false)
            })
            .collect::<Vec<_>>();
        paths.sort();

        let mut total = 0usize;
        for path in paths {
            match self.add_font_file(&path) {
                Ok(n) => total += n,
                Err(err) => tracing::warn!(path = %path.display(), %err, "skipping font file"),
            }
        }
        tracing::debug!(faces = total, "font dir loaded");
        Ok(total)
    }

    /// Family used for generic names and for families the book does not contain.
    pub fn set_default_family(&mut self, family: impl Into<String>) {
        self.default_family = Some(family.into());
    }

    /// Configured default family if present in the book, else the first registered family.
    pub fn default_family(&self) -> Option<&str> {
        self.default_family
            .as_deref()
            .and_then(|want| self.family_name(want))
            .or_else(|| self.faces.first().map(|f| f.family.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn faces(&self) -> &[Arc<FontFace>] {
        &self.faces
    }

    pub(crate) fn files(&self) -> &[Arc<Vec<u8>>] {
        &self.files
    }

    /// Distinct family names in registration order.
    pub fn families(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for f in &self.faces {
            if !out.contains(&f.family.as_str()) {
                out.push(f.family.as_str());
            }
        }
        out
    }

    /// Case-insensitive family lookup, returning the stored spelling.
    fn family_name(&self, family: &str) -> Option<&str> {
        let want = family.trim().trim_matches(|c| c == '"' || c == '\'');
        self.faces
            .iter()
            .find(|f| f.family.eq_ignore_ascii_case(want))
            .map(|f| f.family.as_str())
    }

    /// Pick the face for `family` at `weight`.
    ///
    /// A CSS-style family list (`"Inter, sans-serif"`) is tried left to right. Generic names
    /// and unknown families resolve to the default family; only the unknown case reports
    /// `fell_back`. Within a family the closest weight wins, ties going to the heavier face.
    /// Returns `None` only for an empty book.
    pub fn resolve(&self, family: &str, weight: u16) -> Option<ResolvedFace> {
        let mut fell_back = true;
        let mut chosen = None;
        for candidate in family.split(',') {
            let name = candidate.trim().trim_matches(|c| c == '"' || c == '\'');
            if GENERIC_FAMILIES
                .iter()
                .any(|g| g.eq_ignore_ascii_case(name))
            {
                fell_back = false;
                break;
            }
            if let Some(found) = self.family_name(name) {
                fell_back = false;
                chosen = Some(found);
                break;
            }
        }

        let family = match chosen {
            Some(f) => f,
            None => self.default_family()?,
        };
        let face = self
            .faces
            .iter()
            .filter(|f| f.family == family)
            .min_by_key(|f| {
                let diff = (i32::from(f.weight) - i32::from(weight)).unsigned_abs();
                (diff, std::cmp::Reverse(f.weight))
            })?
            .clone();
        Some(ResolvedFace { face, fell_back })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
