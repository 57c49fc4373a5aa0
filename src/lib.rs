//! Layr places styled text behind or in front of a photo's subject and exports the composite.
//!
//! The pipeline has two stages:
//!
//! - [`ResourceLoader`] decodes the photo and the cutout off the executor
//! - [`Compositor`] draws photo, behind layers, cutout and front layers into one frame
//!
//! [`EditorSession`] ties them to a [`Document`], a background separation service and an
//! [`ExportSink`]. Preview and export share one geometric and color model; the export pass
//! rescales every length through [`ReconciledScale`] so both look the same.
#![forbid(unsafe_code)]

mod assets;
mod document;
mod foundation;
mod layout;

pub mod config;
pub(crate) mod encode;
pub(crate) mod render;
pub(crate) mod separation;
pub mod session;

pub use crate::foundation::core::{Affine, Canvas, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{LayrError, LayrResult};

pub use crate::assets::PreparedImage;
pub use crate::assets::decode::decode_image;
pub use crate::assets::fonts::{FontBook, FontFace, ResolvedFace};
pub use crate::assets::loader::{LoadedResources, RasterHandle, ResourceLoader};
pub use crate::document::blend_mode::BlendMode;
pub use crate::document::color::Color;
pub use crate::document::layer::{
    DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_FONT_WEIGHT, DEFAULT_SHADOW_COLOR,
    DEFAULT_SHADOW_SIZE, DEFAULT_TEXT, LETTER_SPACING_RANGE, LayerAttribute, LayerGroup, LayerId,
    LayerTransform, Paint, Position, TILT_RANGE, TextLayer, Typography,
};
pub use crate::document::model::{
    AspectRatio, Document, DocumentFile, EncodedImage, ImageAdjustments,
};
pub use crate::encode::finalize::{ExportStage, export_file_name, finalize};
pub use crate::encode::png::encode_png;
pub use crate::encode::sink::{DirectorySink, ExportSink, InMemorySink, SavedExport};
pub use crate::layout::geometry::{anchor, layer_transform, tilt_scale};
pub use crate::layout::glyphs::{GlyphPlan, PlacedGlyph, middle_baseline, spaced_origins};
pub use crate::render::compositor::{Compositor, RenderTarget, crop_rect, target_canvas};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::scale::{PreviewSize, ReconciledScale};
pub use crate::separation::mime::{extension_for, sniff_mime};
#[cfg(feature = "http-remover")]
pub use crate::separation::remover::HttpBackgroundRemover;
pub use crate::separation::remover::{BackgroundRemover, DEFAULT_UPLOAD_NAME};
pub use crate::session::{EditorSession, EditorSessionOpts};
