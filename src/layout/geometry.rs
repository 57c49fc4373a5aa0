//! Layer placement math.
//!
//! Positions are percentages of the canvas with the origin at its center and Y pointing up.
//! The layer transform is built in one fixed order: translate to the anchor, then the tilt and
//! scale matrix, then the in-plane rotation. Kurbo composes right-to-left, so rotation is the
//! first thing applied to a glyph-space point.

use crate::document::layer::{LayerTransform, Position, TextLayer};
use crate::foundation::core::{Affine, Canvas, Point};

/// Pixel anchor of a layer on a canvas.
pub fn anchor(canvas: Canvas, position: Position) -> Point {
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    Point::new(
        w * (position.left + 50.0) / 100.0,
        h * (50.0 - position.top) / 100.0,
    )
}

/// Faux-3D tilt folded into the layer's axis scales.
///
/// Tilt around Y shortens the X extent and tilt around X shortens the Y extent; both angles
/// are negated before taking the cosine to match the on-screen rotation direction.
pub fn tilt_scale(transform: &LayerTransform) -> Affine {
    let tilt_x = (-transform.tilt_x).to_radians();
    let tilt_y = (-transform.tilt_y).to_radians();
    Affine::new([
        tilt_y.cos() * transform.scale_x,
        0.0,
        0.0,
        tilt_x.cos() * transform.scale_y,
        0.0,
        0.0,
    ])
}

/// Glyph-space to canvas-space transform: `translate(anchor) * tilt_scale * rotate`.
pub fn layer_transform(layer: &TextLayer, canvas: Canvas) -> Affine {
    let at = anchor(canvas, layer.position);
    Affine::translate(at.to_vec2())
        * tilt_scale(&layer.transform)
        * Affine::rotate(layer.transform.rotation.to_radians())
}

#[cfg(test)]
#[path = "../../tests/unit/layout/geometry.rs"]
mod tests;
