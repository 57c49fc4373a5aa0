use std::sync::Arc;

use crate::assets::PreparedImage;
use crate::assets::decode::decode_image;
use crate::document::model::{Document, EncodedImage};
use crate::foundation::error::{LayrError, LayrResult};
use crate::render::frame::rgba_premul_to_image;

/// Decoded raster plus the paint the rasterizer samples from.
#[derive(Clone, Debug)]
pub struct RasterHandle {
    prepared: Arc<PreparedImage>,
    pub(crate) image: vello_cpu::Image,
}

impl RasterHandle {
    pub fn from_prepared(prepared: PreparedImage) -> LayrResult<Self> {
        let image =
            rgba_premul_to_image(&prepared.rgba8_premul, prepared.width, prepared.height)?;
        Ok(Self {
            prepared: Arc::new(prepared),
            image,
        })
    }

    pub fn width(&self) -> u32 {
        self.prepared.width
    }

    pub fn height(&self) -> u32 {
        self.prepared.height
    }

    pub fn prepared(&self) -> &PreparedImage {
        &self.prepared
    }
}

/// Both image surfaces of a document, decoded.
#[derive(Clone, Debug)]
pub struct LoadedResources {
    pub photo: RasterHandle,
    pub cutout: Option<RasterHandle>,
}

/// Decodes a document's photo and cutout off the async executor.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResourceLoader;

impl ResourceLoader {
    pub fn new() -> Self {
        Self
    }

    /// Decode the photo, then the cutout, on blocking workers.
    ///
    /// Resolves only once both handles exist, so drawing never starts on a partial set.
    /// A document without a photo fails with [`LayrError::MissingPhoto`].
    #[tracing::instrument(skip_all)]
    pub async fn load(&self, doc: &Document) -> LayrResult<LoadedResources> {
        let photo = doc.photo().cloned().ok_or(LayrError::MissingPhoto)?;
        let photo = decode_blocking(photo, "photo").await?;
        let cutout = match doc.cutout().cloned() {
            Some(c) => Some(decode_blocking(c, "cutout").await?),
            None => None,
        };
        tracing::debug!(
            photo_w = photo.width(),
            photo_h = photo.height(),
            has_cutout = cutout.is_some(),
            "resources ready"
        );
        Ok(LoadedResources { photo, cutout })
    }

    /// Synchronous variant for callers already off the executor.
    pub fn load_blocking(&self, doc: &Document) -> LayrResult<LoadedResources> {
        let photo = doc.photo().ok_or(LayrError::MissingPhoto)?;
        let photo = decode_handle(photo, "photo")?;
        let cutout = doc
            .cutout()
            .map(|c| decode_handle(c, "cutout"))
            .transpose()?;
        Ok(LoadedResources { photo, cutout })
    }
}

fn decode_handle(encoded: &EncodedImage, what: &'static str) -> LayrResult<RasterHandle> {
    let prepared = decode_image(&encoded.bytes).map_err(|e| match e {
        LayrError::Decode(msg) => LayrError::decode(format!("{what}: {msg}")),
        other => other,
    })?;
    RasterHandle::from_prepared(prepared).map_err(|e| LayrError::decode(format!("{what}: {e}")))
}

async fn decode_blocking(
    encoded: Arc<EncodedImage>,
    what: &'static str,
) -> LayrResult<RasterHandle> {
    tokio::task::spawn_blocking(move || decode_handle(&encoded, what))
        .await
        .map_err(|e| LayrError::Other(anyhow::anyhow!("{what} decode task failed: {e}")))?
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
