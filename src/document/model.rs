use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::document::layer::{LayerAttribute, LayerGroup, LayerId, TextLayer};
use crate::foundation::error::{LayrError, LayrResult};
use crate::separation::mime::sniff_mime;

/// Encoded image bytes as uploaded or as returned by background separation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Raw encoded file contents (PNG, JPEG, WebP, ...).
    pub bytes: Arc<[u8]>,
    /// MIME type reported by whoever produced the bytes, if any.
    pub mime: Option<String>,
    /// Original file name, if known.
    pub file_name: Option<String>,
}

impl EncodedImage {
    /// Wrap bytes without metadata.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
            mime: None,
            file_name: None,
        }
    }

    /// Attach a MIME type.
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Attach a file name.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Reported MIME type, else one sniffed from the magic bytes, else `application/octet-stream`.
    pub fn mime_or_sniffed(&self) -> &str {
        self.mime
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| sniff_mime(&self.bytes))
            .unwrap_or("application/octet-stream")
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Canvas aspect ratio choices offered by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// Keep the photo's own proportions.
    #[default]
    #[serde(rename = "original")]
    Original,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:5")]
    Portrait4x5,
    #[serde(rename = "3:2")]
    Landscape3x2,
    #[serde(rename = "16:9")]
    Wide16x9,
}

impl AspectRatio {
    /// Width over height, or `None` for [`AspectRatio::Original`].
    pub fn ratio(self) -> Option<f64> {
        match self {
            Self::Original => None,
            Self::Square => Some(1.0),
            Self::Portrait4x5 => Some(4.0 / 5.0),
            Self::Landscape3x2 => Some(3.0 / 2.0),
            Self::Wide16x9 => Some(16.0 / 9.0),
        }
    }

    /// Parse the editor's select value; unknown values keep the original proportions.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "1:1" => Self::Square,
            "4:5" => Self::Portrait4x5,
            "3:2" => Self::Landscape3x2,
            "16:9" => Self::Wide16x9,
            _ => Self::Original,
        }
    }
}

/// Global adjustments applied to the base photo only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageAdjustments {
    /// In-plane rotation around the photo center, degrees.
    pub rotation_deg: f64,
    /// CSS `brightness()` factor, `1` = unchanged.
    pub brightness: f64,
    /// CSS `contrast()` factor, `1` = unchanged.
    pub contrast: f64,
    pub aspect_ratio: AspectRatio,
}

impl Default for ImageAdjustments {
    fn default() -> Self {
        Self {
            rotation_deg: 0.0,
            brightness: 1.0,
            contrast: 1.0,
            aspect_ratio: AspectRatio::Original,
        }
    }
}

impl ImageAdjustments {
    /// Whether the photo needs the rotate / color-matrix pass.
    pub fn is_active(&self) -> bool {
        self.rotation_deg != 0.0 || self.brightness != 1.0 || self.contrast != 1.0
    }

    /// Replace non-finite values and clamp the color factors to be non-negative.
    pub fn normalized(self) -> Self {
        let d = Self::default();
        let fin = |v: f64, f: f64| if v.is_finite() { v } else { f };
        Self {
            rotation_deg: fin(self.rotation_deg, d.rotation_deg),
            brightness: fin(self.brightness, d.brightness).max(0.0),
            contrast: fin(self.contrast, d.contrast).max(0.0),
            aspect_ratio: self.aspect_ratio,
        }
    }
}

/// Editable state: ordered text layers, the two image surfaces and photo adjustments.
///
/// Cloning is cheap (images are shared), so callers snapshot a document before handing it to
/// the loader or compositor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    layers: Vec<TextLayer>,
    photo: Option<Arc<EncodedImage>>,
    cutout: Option<Arc<EncodedImage>>,
    adjustments: ImageAdjustments,
    next_id: u64,
}

/// Serialized layer list plus adjustments, as stored in a document file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentFile {
    pub layers: Vec<TextLayer>,
    pub adjustments: ImageAdjustments,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from a parsed file. Layer ids are reassigned when they collide.
    pub fn from_file(file: DocumentFile) -> Self {
        let mut doc = Self::new();
        doc.adjustments = file.adjustments.normalized();
        for layer in file.layers {
            let taken = doc.layers.iter().any(|l| l.id == layer.id);
            if taken || layer.id.0 == 0 {
                doc.add_layer_with(layer);
            } else {
                doc.next_id = doc.next_id.max(layer.id.0);
                doc.layers.push(layer.normalized());
            }
        }
        doc
    }

    /// Parse a document file from JSON.
    pub fn from_json(json: &str) -> LayrResult<Self> {
        let file: DocumentFile = serde_json::from_str(json)
            .map_err(|e| LayrError::validation(format!("invalid document json: {e}")))?;
        Ok(Self::from_file(file))
    }

    /// Layer list and adjustments in file form.
    pub fn to_file(&self) -> DocumentFile {
        DocumentFile {
            layers: self.layers.clone(),
            adjustments: self.adjustments,
        }
    }

    fn fresh_id(&mut self) -> LayerId {
        self.next_id += 1;
        LayerId(self.next_id)
    }

    fn index_of(&self, id: LayerId) -> LayrResult<usize> {
        self.layers
            .iter()
            .position(|l| l.id == id)
            .ok_or(LayrError::LayerNotFound(id))
    }

    /// Append a layer with every attribute at its default.
    pub fn add_layer(&mut self) -> LayerId {
        let id = self.fresh_id();
        self.layers.push(TextLayer::new(id));
        id
    }

    /// Append `layer` under a fresh id.
    pub fn add_layer_with(&mut self, mut layer: TextLayer) -> LayerId {
        let id = self.fresh_id();
        layer.id = id;
        self.layers.push(layer.normalized());
        id
    }

    /// Change one field; the stored value is replaced by a normalized copy.
    pub fn update_layer(&mut self, id: LayerId, attr: LayerAttribute) -> LayrResult<()> {
        self.edit_layer(id, |layer| attr.apply_to(layer))
    }

    /// Change several fields at once under the same replace-and-normalize rule.
    ///
    /// The id is kept even if `edit` overwrites it.
    pub fn edit_layer(&mut self, id: LayerId, edit: impl FnOnce(&mut TextLayer)) -> LayrResult<()> {
        let idx = self.index_of(id)?;
        let mut next = self.layers[idx].clone();
        edit(&mut next);
        next.id = id;
        self.layers[idx] = next.normalized();
        Ok(())
    }

    /// Copy a layer under a new id, appended at the end of the list.
    pub fn duplicate_layer(&mut self, id: LayerId) -> LayrResult<LayerId> {
        let idx = self.index_of(id)?;
        let copy = self.layers[idx].clone();
        Ok(self.add_layer_with(copy))
    }

    pub fn remove_layer(&mut self, id: LayerId) -> LayrResult<TextLayer> {
        let idx = self.index_of(id)?;
        Ok(self.layers.remove(idx))
    }

    pub fn layer(&self, id: LayerId) -> Option<&TextLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layers(&self) -> &[TextLayer] {
        &self.layers
    }

    /// Layers of one group in insertion order.
    pub fn layers_in(&self, group: LayerGroup) -> impl Iterator<Item = &TextLayer> + '_ {
        self.layers.iter().filter(move |l| l.group == group)
    }

    pub fn photo(&self) -> Option<&Arc<EncodedImage>> {
        self.photo.as_ref()
    }

    pub fn cutout(&self) -> Option<&Arc<EncodedImage>> {
        self.cutout.as_ref()
    }

    /// Install a new base photo. The previous cutout belonged to the old photo and is dropped.
    pub fn set_photo(&mut self, photo: EncodedImage) {
        self.photo = Some(Arc::new(photo));
        self.cutout = None;
    }

    /// Install the separated subject for the current photo.
    pub fn set_cutout(&mut self, cutout: EncodedImage) {
        self.cutout = Some(Arc::new(cutout));
    }

    pub fn adjustments(&self) -> ImageAdjustments {
        self.adjustments
    }

    pub fn set_adjustments(&mut self, adjustments: ImageAdjustments) {
        self.adjustments = adjustments.normalized();
    }

    pub fn reset_adjustments(&mut self) {
        self.adjustments = ImageAdjustments::default();
    }

    /// Same document with its layer list replaced, used for scaled render snapshots.
    pub(crate) fn with_layers(&self, layers: Vec<TextLayer>) -> Self {
        Self {
            layers,
            ..self.clone()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
