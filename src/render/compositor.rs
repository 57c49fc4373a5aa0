//! Draw order across the photo, the text layers and the cutout.
//!
//! One composite is strictly sequential: photo, behind layers, cutout, front layers. Every text
//! layer is painted alone into an isolation surface and merged into the target in a single step
//! with its blend kernel and opacity.

use vello_cpu::RenderContext;

use crate::assets::fonts::FontBook;
use crate::assets::loader::{LoadedResources, RasterHandle};
use crate::assets::text::TextLayoutEngine;
use crate::document::layer::{LayerGroup, TextLayer};
use crate::document::model::{AspectRatio, Document, ImageAdjustments};
use crate::foundation::core::{Affine, Canvas, Rect, Vec2};
use crate::foundation::error::{LayrError, LayrResult};
use crate::layout::geometry::layer_transform;
use crate::layout::glyphs::plan_glyphs;
use crate::render::blend::{composite_over_rgba8_premul, premul_over_in_place};
use crate::render::blur::BlurKernelCache;
use crate::render::frame::{
    FrameRGBA, affine_to_cpu, clear_pixmap_to_transparent, rgba_premul_to_image,
};
use crate::render::paint::{LayerSurfaces, paint_layer_isolated};

/// Output size of one composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderTarget {
    /// The measured preview surface.
    Preview { width: u32, height: u32 },
    /// The photo's native resolution after the aspect-ratio crop.
    Export,
}

/// Centered source rectangle of `aspect` inside a `width` x `height` image.
pub fn crop_rect(width: u32, height: u32, aspect: AspectRatio) -> Rect {
    let (w, h) = (f64::from(width), f64::from(height));
    let Some(ratio) = aspect.ratio() else {
        return Rect::new(0.0, 0.0, w, h);
    };
    if w / h > ratio {
        let cw = h * ratio;
        let x0 = (w - cw) / 2.0;
        Rect::new(x0, 0.0, x0 + cw, h)
    } else {
        let ch = w / ratio;
        let y0 = (h - ch) / 2.0;
        Rect::new(0.0, y0, w, y0 + ch)
    }
}

/// Canvas a target resolves to for a given photo.
pub fn target_canvas(
    target: RenderTarget,
    photo_width: u32,
    photo_height: u32,
    aspect: AspectRatio,
) -> LayrResult<Canvas> {
    match target {
        RenderTarget::Preview { width, height } => Canvas::new(width, height),
        RenderTarget::Export => {
            let crop = crop_rect(photo_width, photo_height, aspect);
            Canvas::new(
                (crop.width().round() as u32).max(1),
                (crop.height().round() as u32).max(1),
            )
        }
    }
}

/// Maps the centered crop of a `width` x `height` raster onto the whole canvas.
fn crop_to_canvas(width: u32, height: u32, aspect: AspectRatio, canvas: Canvas) -> (Rect, Affine) {
    let crop = crop_rect(width, height, aspect);
    let sx = f64::from(canvas.width) / crop.width();
    let sy = f64::from(canvas.height) / crop.height();
    let tr = Affine::scale_non_uniform(sx, sy) * Affine::translate(-Vec2::new(crop.x0, crop.y0));
    (crop, tr)
}

/// Brightness then contrast as one 4x5 color matrix on straight RGBA.
///
/// `brightness(b)` scales each channel by `b`; `contrast(c)` maps `x` to `c * (x - 0.5) + 0.5`.
pub(crate) fn adjustment_matrix(brightness: f64, contrast: f64) -> [f32; 20] {
    let gain = (contrast * brightness) as f32;
    let offset = (0.5 * (1.0 - contrast)) as f32;
    [
        gain, 0.0, 0.0, 0.0, offset, //
        0.0, gain, 0.0, 0.0, offset, //
        0.0, 0.0, gain, 0.0, offset, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]
}

pub(crate) fn color_matrix_rgba8_premul(src: &[u8], dst: &mut [u8], m: [f32; 20]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let pa = s[3] as f32 / 255.0;
        let inv_a = if pa > 0.0 { 1.0 / pa } else { 0.0 };
        let r = s[0] as f32 / 255.0 * inv_a;
        let g = s[1] as f32 / 255.0 * inv_a;
        let b = s[2] as f32 / 255.0 * inv_a;

        let out_r = (m[0] * r + m[1] * g + m[2] * b + m[3] * pa + m[4]).clamp(0.0, 1.0);
        let out_g = (m[5] * r + m[6] * g + m[7] * b + m[8] * pa + m[9]).clamp(0.0, 1.0);
        let out_b = (m[10] * r + m[11] * g + m[12] * b + m[13] * pa + m[14]).clamp(0.0, 1.0);
        let out_a = (m[15] * r + m[16] * g + m[17] * b + m[18] * pa + m[19]).clamp(0.0, 1.0);

        d[0] = (out_r * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        d[1] = (out_g * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        d[2] = (out_b * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        d[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

/// Renders documents into frames.
///
/// Owns the shaping engine, the blur kernel cache and the rasterizer context, so one
/// compositor serves one composite at a time; concurrent exports use separate compositors.
pub struct Compositor {
    fonts: FontBook,
    engine: TextLayoutEngine,
    kernels: BlurKernelCache,
    ctx: Option<RenderContext>,
}

impl Compositor {
    /// Build a compositor over `fonts`. The book must hold at least one face.
    pub fn new(fonts: FontBook) -> LayrResult<Self> {
        if fonts.is_empty() {
            return Err(LayrError::font("compositor needs at least one font face"));
        }
        let engine = TextLayoutEngine::new(&fonts);
        Ok(Self {
            fonts,
            engine,
            kernels: BlurKernelCache::default(),
            ctx: None,
        })
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    fn context_for(&mut self, canvas: Canvas) -> RenderContext {
        let (w, h) = canvas.dims_u16();
        match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => RenderContext::new(w, h),
        }
    }

    /// Produce one frame from `doc` and its decoded images.
    ///
    /// The document is read, never modified. Returned pixels are premultiplied.
    #[tracing::instrument(skip_all, fields(layers = doc.layers().len(), target = ?target))]
    pub fn composite(
        &mut self,
        doc: &Document,
        resources: &LoadedResources,
        target: RenderTarget,
    ) -> LayrResult<FrameRGBA> {
        let adjustments = doc.adjustments();
        let photo = &resources.photo;
        let canvas = target_canvas(
            target,
            photo.width(),
            photo.height(),
            adjustments.aspect_ratio,
        )?;

        let mut ctx = self.context_for(canvas);
        let out = self.composite_with(&mut ctx, doc, resources, canvas, adjustments);
        self.ctx = Some(ctx);
        let frame = out?;
        tracing::debug!(width = frame.width, height = frame.height, "composite done");
        Ok(frame)
    }

    fn composite_with(
        &mut self,
        ctx: &mut RenderContext,
        doc: &Document,
        resources: &LoadedResources,
        canvas: Canvas,
        adjustments: ImageAdjustments,
    ) -> LayrResult<FrameRGBA> {
        let (w, h) = canvas.dims_u16();
        let mut target = vello_cpu::Pixmap::new(w, h);
        let mut surfaces = LayerSurfaces::new(canvas);

        draw_photo(ctx, &mut target, &resources.photo, canvas, adjustments)?;

        for layer in doc.layers_in(LayerGroup::Behind) {
            self.merge_layer(ctx, &mut surfaces, &mut target, layer, canvas)?;
        }

        if let Some(cutout) = &resources.cutout {
            draw_cutout(ctx, &mut surfaces, &mut target, cutout, canvas, adjustments.aspect_ratio);
        }

        for layer in doc.layers_in(LayerGroup::Front) {
            self.merge_layer(ctx, &mut surfaces, &mut target, layer, canvas)?;
        }

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: target.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn merge_layer(
        &mut self,
        ctx: &mut RenderContext,
        surfaces: &mut LayerSurfaces,
        target: &mut vello_cpu::Pixmap,
        layer: &TextLayer,
        canvas: Canvas,
    ) -> LayrResult<()> {
        if layer.is_blank() || layer.paint.opacity <= 0.0 {
            return Ok(());
        }
        let resolved = self
            .fonts
            .resolve(&layer.typography.font_family, layer.typography.font_weight)
            .ok_or_else(|| LayrError::font("font book has no faces"))?;
        if resolved.fell_back {
            tracing::warn!(
                layer = %layer.id,
                requested = %layer.typography.font_family,
                used = %resolved.face.family,
                "font family not found, using default"
            );
        }

        let plan = plan_glyphs(
            &mut self.engine,
            resolved.face,
            &layer.text,
            layer.typography.font_size,
            layer.typography.letter_spacing,
        )?;
        let transform = layer_transform(layer, canvas);
        paint_layer_isolated(ctx, surfaces, &mut self.kernels, &plan, layer, transform)?;
        composite_over_rgba8_premul(
            target.data_as_u8_slice_mut(),
            surfaces.isolation.data_as_u8_slice(),
            layer.paint.opacity as f32,
            layer.paint.blend_mode,
        )
    }
}

fn draw_photo(
    ctx: &mut RenderContext,
    target: &mut vello_cpu::Pixmap,
    photo: &RasterHandle,
    canvas: Canvas,
    adjustments: ImageAdjustments,
) -> LayrResult<()> {
    let (crop, to_canvas) =
        crop_to_canvas(photo.width(), photo.height(), adjustments.aspect_ratio, canvas);
    let rotation = Affine::rotate_about(adjustments.rotation_deg.to_radians(), canvas.center());

    let tone_mapped;
    let image = if adjustments.brightness != 1.0 || adjustments.contrast != 1.0 {
        let src = photo.prepared();
        let mut adjusted = vec![0u8; src.rgba8_premul.len()];
        color_matrix_rgba8_premul(
            &src.rgba8_premul,
            &mut adjusted,
            adjustment_matrix(adjustments.brightness, adjustments.contrast),
        );
        tone_mapped = rgba_premul_to_image(&adjusted, src.width, src.height)?;
        &tone_mapped
    } else {
        &photo.image
    };

    ctx.reset();
    ctx.set_transform(affine_to_cpu(rotation * to_canvas));
    ctx.set_paint(image.clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(crop.x0, crop.y0, crop.x1, crop.y1));
    ctx.flush();
    ctx.render_to_pixmap(target);
    Ok(())
}

fn draw_cutout(
    ctx: &mut RenderContext,
    surfaces: &mut LayerSurfaces,
    target: &mut vello_cpu::Pixmap,
    cutout: &RasterHandle,
    canvas: Canvas,
    aspect: AspectRatio,
) {
    let (crop, to_canvas) = crop_to_canvas(cutout.width(), cutout.height(), aspect, canvas);
    clear_pixmap_to_transparent(&mut surfaces.isolation);
    ctx.reset();
    ctx.set_transform(affine_to_cpu(to_canvas));
    ctx.set_paint(cutout.image.clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(crop.x0, crop.y0, crop.x1, crop.y1));
    ctx.flush();
    ctx.render_to_pixmap(&mut surfaces.isolation);
    premul_over_in_place(
        target.data_as_u8_slice_mut(),
        surfaces.isolation.data_as_u8_slice(),
    );
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
