//! Export finalizer: `CompositeComplete -> Encoded -> Saved`.

use crate::encode::png::encode_png;
use crate::encode::sink::{ExportSink, SavedExport};
use crate::foundation::error::LayrResult;
use crate::render::frame::FrameRGBA;

/// Stages an export passes through once the composite is done.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportStage {
    CompositeComplete,
    Encoded,
    Saved,
}

/// Deterministic export file name from the product name: lowercase, whitespace runs become
/// `-`, `.png` appended. An empty name yields `export.png`.
pub fn export_file_name(app_name: &str) -> String {
    let slug = app_name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "export.png".to_owned()
    } else {
        format!("{slug}.png")
    }
}

/// Encode `frame` and hand it to `sink`.
///
/// Nothing reaches the sink unless encoding succeeds.
#[tracing::instrument(skip(frame, sink), fields(w = frame.width, h = frame.height))]
pub fn finalize(
    frame: &FrameRGBA,
    app_name: &str,
    sink: &mut dyn ExportSink,
) -> LayrResult<SavedExport> {
    tracing::debug!(stage = ?ExportStage::CompositeComplete);
    let bytes = encode_png(frame)?;
    tracing::debug!(stage = ?ExportStage::Encoded, bytes = bytes.len());
    let saved = sink.save(&export_file_name(app_name), &bytes)?;
    tracing::debug!(stage = ?ExportStage::Saved, file = %saved.file_name);
    Ok(saved)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/finalize.rs"]
mod tests;
