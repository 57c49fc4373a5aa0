//! Preview-to-export scale reconciliation.
//!
//! Layer lengths are authored against the preview surface. An export renders at the photo's
//! native height, so every length-valued attribute is multiplied by `export / preview` on a
//! snapshot taken for that pass only.

use crate::document::layer::TextLayer;
use crate::document::model::Document;

/// Measured size of the on-screen preview, in preview pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PreviewSize {
    pub width: f64,
    pub height: f64,
}

impl PreviewSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A preview that has not been laid out yet reports a zero height.
    pub fn is_measured(&self) -> bool {
        self.height.is_finite() && self.height > 0.0
    }
}

/// Factor mapping preview lengths to export lengths.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReconciledScale(f64);

impl ReconciledScale {
    pub const IDENTITY: Self = Self(1.0);

    /// `export_height / preview_height`, or identity when the preview is unmeasured.
    pub fn between(preview_height: f64, export_height: f64) -> Self {
        if !preview_height.is_finite() || preview_height <= 0.0 {
            return Self::IDENTITY;
        }
        let s = export_height / preview_height;
        if s.is_finite() && s > 0.0 {
            Self(s)
        } else {
            Self::IDENTITY
        }
    }

    pub fn for_preview(preview: PreviewSize, export_height: u32) -> Self {
        Self::between(preview.height, f64::from(export_height))
    }

    pub fn factor(self) -> f64 {
        self.0
    }

    pub fn is_identity(self) -> bool {
        self.0 == 1.0
    }
}

impl Default for ReconciledScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TextLayer {
    /// Copy with font size, stroke width, shadow size and letter spacing multiplied by `scale`.
    pub fn scaled(&self, scale: ReconciledScale) -> TextLayer {
        let s = scale.factor();
        let mut out = self.clone();
        out.typography.font_size *= s;
        out.typography.letter_spacing *= s;
        out.paint.stroke_width *= s;
        out.paint.shadow_size *= s;
        out
    }
}

impl Document {
    /// Render snapshot with every layer scaled. `self` is left untouched.
    pub fn scaled_snapshot(&self, scale: ReconciledScale) -> Document {
        if scale.is_identity() {
            return self.clone();
        }
        self.with_layers(self.layers().iter().map(|l| l.scaled(scale)).collect())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scale.rs"]
mod tests;
