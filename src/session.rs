//! Editor session: one document plus the pipelines that read it.
//!
//! - [`EditorSession::upload`] installs a photo and asks the separation service for its cutout
//! - [`EditorSession::preview`] renders at the measured preview size
//! - [`EditorSession::export`] renders at native resolution with reconciled lengths, encodes and
//!   saves
//!
//! Every render works on a snapshot of the document taken when it starts.

use std::sync::Arc;

use crate::assets::fonts::FontBook;
use crate::assets::loader::ResourceLoader;
use crate::config::{DEFAULT_MAX_UPLOAD_BYTES, LayrConfig};
use crate::document::model::{Document, EncodedImage};
use crate::encode::finalize::finalize;
use crate::encode::sink::{ExportSink, SavedExport};
use crate::foundation::error::{LayrError, LayrResult};
use crate::render::compositor::{Compositor, RenderTarget, target_canvas};
use crate::render::frame::FrameRGBA;
use crate::render::scale::{PreviewSize, ReconciledScale};
use crate::separation::remover::BackgroundRemover;

/// Options for an [`EditorSession`].
#[derive(Clone, Debug)]
pub struct EditorSessionOpts {
    /// Product name; export files are named after it.
    pub app_name: String,
    /// Uploads larger than this are refused before anything else happens.
    pub max_upload_bytes: u64,
}

impl Default for EditorSessionOpts {
    fn default() -> Self {
        Self {
            app_name: "Layr".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl From<&LayrConfig> for EditorSessionOpts {
    fn from(config: &LayrConfig) -> Self {
        Self {
            app_name: config.app.name.clone(),
            max_upload_bytes: config.upload.max_bytes,
        }
    }
}

pub struct EditorSession {
    doc: Document,
    compositor: Compositor,
    loader: ResourceLoader,
    remover: Option<Arc<dyn BackgroundRemover>>,
    preview: PreviewSize,
    opts: EditorSessionOpts,
}

impl EditorSession {
    pub fn new(fonts: FontBook, opts: EditorSessionOpts) -> LayrResult<Self> {
        Ok(Self {
            doc: Document::new(),
            compositor: Compositor::new(fonts)?,
            loader: ResourceLoader::new(),
            remover: None,
            preview: PreviewSize::default(),
            opts,
        })
    }

    /// Session wired from configuration: fonts from `[fonts]`, and the HTTP separation service
    /// when `[separation] endpoint` is set.
    pub fn from_config(config: &LayrConfig) -> LayrResult<Self> {
        let mut fonts = FontBook::new();
        for dir in &config.fonts.dirs {
            fonts.load_dir(dir)?;
        }
        if let Some(family) = &config.fonts.default_family {
            fonts.set_default_family(family.clone());
        }
        let session = Self::new(fonts, EditorSessionOpts::from(config))?;

        #[cfg(feature = "http-remover")]
        if let Some(endpoint) = &config.separation.endpoint {
            let mut remover = crate::separation::remover::HttpBackgroundRemover::new(endpoint);
            if let Some(timeout) = config.separation.timeout() {
                remover = remover.with_timeout(timeout);
            }
            return Ok(session.with_remover(Arc::new(remover)));
        }
        Ok(session)
    }

    pub fn with_remover(mut self, remover: Arc<dyn BackgroundRemover>) -> Self {
        self.remover = Some(remover);
        self
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn replace_document(&mut self, doc: Document) {
        self.doc = doc;
    }

    pub fn fonts(&self) -> &FontBook {
        self.compositor.fonts()
    }

    /// Record the preview surface's current rendered size.
    pub fn set_preview_size(&mut self, size: PreviewSize) {
        self.preview = size;
    }

    pub fn preview_size(&self) -> PreviewSize {
        self.preview
    }

    /// Install `image` as the photo, then run background separation on it.
    ///
    /// The photo stays installed even when separation fails; the cutout is then absent, the
    /// error is returned and every render still works without the behind effect. Without a
    /// configured remover the upload simply has no cutout.
    #[tracing::instrument(skip_all, fields(bytes = image.len()))]
    pub async fn upload(&mut self, image: EncodedImage) -> LayrResult<()> {
        if image.is_empty() {
            return Err(LayrError::validation("upload is empty"));
        }
        if image.len() as u64 > self.opts.max_upload_bytes {
            return Err(LayrError::validation(format!(
                "upload of {} bytes exceeds the {} byte limit",
                image.len(),
                self.opts.max_upload_bytes
            )));
        }

        self.doc.set_photo(image.clone());
        let Some(remover) = self.remover.clone() else {
            tracing::debug!("no background remover configured, cutout stays absent");
            return Ok(());
        };
        let cutout = remover.remove_background(image).await?;
        self.doc.set_cutout(cutout);
        tracing::debug!("cutout installed");
        Ok(())
    }

    /// Render the current document at the measured preview size.
    #[tracing::instrument(skip_all)]
    pub async fn preview(&mut self) -> LayrResult<FrameRGBA> {
        if !self.preview.is_measured() {
            return Err(LayrError::validation("preview size has not been measured"));
        }
        let target = RenderTarget::Preview {
            width: (self.preview.width.round() as u32).max(1),
            height: (self.preview.height.round() as u32).max(1),
        };
        let snapshot = self.doc.clone();
        let resources = self.loader.load(&snapshot).await?;
        self.compositor.composite(&snapshot, &resources, target)
    }

    /// Render the export frame without encoding it.
    ///
    /// Lengths are reconciled from the preview height to the export height on a snapshot;
    /// the stored document keeps its preview-space values.
    #[tracing::instrument(skip_all)]
    pub async fn render_export(&mut self) -> LayrResult<FrameRGBA> {
        let snapshot = self.doc.clone();
        let resources = self.loader.load(&snapshot).await?;
        let canvas = target_canvas(
            RenderTarget::Export,
            resources.photo.width(),
            resources.photo.height(),
            snapshot.adjustments().aspect_ratio,
        )?;
        let scale = ReconciledScale::for_preview(self.preview, canvas.height);
        tracing::debug!(scale = scale.factor(), export_h = canvas.height, "reconciled scale");
        let scaled = snapshot.scaled_snapshot(scale);
        self.compositor
            .composite(&scaled, &resources, RenderTarget::Export)
    }

    /// Render, encode and save the export. A failed render or encode never reaches `sink`.
    pub async fn export(&mut self, sink: &mut dyn ExportSink) -> LayrResult<SavedExport> {
        let frame = self.render_export().await?;
        finalize(&frame, &self.opts.app_name, sink)
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
