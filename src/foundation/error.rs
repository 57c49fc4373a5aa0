use crate::document::layer::LayerId;

/// Convenience result type used across Layr.
pub type LayrResult<T> = Result<T, LayrError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Layer attributes never produce errors; they are normalized on construction and update.
#[derive(thiserror::Error, Debug)]
pub enum LayrError {
    /// Invalid caller-provided data (canvas sizes, colors, attribute payloads).
    #[error("validation error: {0}")]
    Validation(String),

    /// A source raster (photo or cutout) could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The composite could not be serialized to an encoded image.
    #[error("encode error: {0}")]
    Encode(String),

    /// Compositing was requested without a base photo.
    #[error("missing photo: nothing to draw on")]
    MissingPhoto,

    /// No layer with this id exists in the document.
    #[error("layer not found: {0}")]
    LayerNotFound(LayerId),

    /// Font catalogue problems (no usable faces, unreadable font files).
    #[error("font error: {0}")]
    Font(String),

    /// The background-separation collaborator failed.
    #[error("background separation failed (status {status:?}): {details}")]
    Separation {
        /// Upstream HTTP status, when the failure came from a response.
        status: Option<u16>,
        /// Upstream error text.
        details: String,
    },

    /// Filesystem failure while reading inputs or saving an export.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayrError {
    /// Build a [`LayrError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LayrError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`LayrError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`LayrError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`LayrError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`LayrError::Separation`] value.
    pub fn separation(status: Option<u16>, details: impl Into<String>) -> Self {
        Self::Separation {
            status,
            details: details.into(),
        }
    }

    /// Resource errors (undecodable photo or cutout, missing photo) abort a composite.
    pub fn is_resource_error(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::MissingPhoto)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
