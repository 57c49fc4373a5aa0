//! Drawing one text layer into its isolation surface.
//!
//! Passes run shadow, then stroke, then fill. The result is a canvas-sized premultiplied
//! surface holding only this layer, which the compositor merges into the target exactly once.

use vello_cpu::RenderContext;

use crate::document::color::Color;
use crate::document::layer::TextLayer;
use crate::foundation::core::{Affine, Canvas};
use crate::foundation::error::LayrResult;
use crate::layout::glyphs::GlyphPlan;
use crate::render::blend::premul_over_in_place;
use crate::render::blur::{BlurKernelCache, blur_rgba8_premul_in_place, shadow_sigma};
use crate::render::frame::{affine_to_cpu, clear_pixmap_to_transparent};

/// Miter limit for text outlines.
pub(crate) const STROKE_MITER_LIMIT: f64 = 2.0;

/// Snapshot of every piece of render context state a pass may touch.
#[derive(Clone)]
pub(crate) struct PaintState {
    transform: vello_cpu::kurbo::Affine,
    paint_transform: vello_cpu::kurbo::Affine,
    paint: vello_cpu::PaintType,
    stroke: vello_cpu::kurbo::Stroke,
    blend_mode: vello_cpu::peniko::BlendMode,
    fill_rule: vello_cpu::peniko::Fill,
}

impl PaintState {
    pub(crate) fn capture(ctx: &RenderContext) -> Self {
        Self {
            transform: *ctx.transform(),
            paint_transform: *ctx.paint_transform(),
            paint: ctx.paint().clone(),
            stroke: ctx.stroke().clone(),
            blend_mode: ctx.blend_mode(),
            fill_rule: *ctx.fill_rule(),
        }
    }

    pub(crate) fn restore(self, ctx: &mut RenderContext) {
        ctx.set_transform(self.transform);
        ctx.set_paint_transform(self.paint_transform);
        ctx.set_paint(self.paint);
        ctx.set_stroke(self.stroke);
        ctx.set_blend_mode(self.blend_mode);
        ctx.set_fill_rule(self.fill_rule);
    }

    /// Run `f` and put the context state back exactly as it was.
    pub(crate) fn scoped<R>(ctx: &mut RenderContext, f: impl FnOnce(&mut RenderContext) -> R) -> R {
        let saved = Self::capture(ctx);
        let out = f(ctx);
        saved.restore(ctx);
        out
    }
}

/// Canvas-sized surfaces reused for every layer of one composite.
pub(crate) struct LayerSurfaces {
    pub(crate) isolation: vello_cpu::Pixmap,
    scratch: vello_cpu::Pixmap,
}

impl LayerSurfaces {
    pub(crate) fn new(canvas: Canvas) -> Self {
        let (w, h) = canvas.dims_u16();
        Self {
            isolation: vello_cpu::Pixmap::new(w, h),
            scratch: vello_cpu::Pixmap::new(w, h),
        }
    }
}

fn cpu_color(c: Color) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = c.to_rgba8();
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

enum Pass {
    Shadow,
    Stroke,
    Fill,
}

fn draw_pass(ctx: &mut RenderContext, plan: &GlyphPlan, layer: &TextLayer, tr: Affine, pass: Pass) {
    PaintState::scoped(ctx, |ctx| {
        ctx.set_transform(affine_to_cpu(tr));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        match pass {
            Pass::Shadow => {
                ctx.set_paint(cpu_color(layer.paint.shadow_color));
                ctx.glyph_run(&plan.face.data)
                    .font_size(plan.font_size)
                    .fill_glyphs(plan.cpu_glyphs());
            }
            Pass::Stroke => {
                ctx.set_stroke(
                    vello_cpu::kurbo::Stroke::new(layer.paint.stroke_width)
                        .with_miter_limit(STROKE_MITER_LIMIT),
                );
                ctx.set_paint(cpu_color(layer.paint.stroke_color));
                ctx.glyph_run(&plan.face.data)
                    .font_size(plan.font_size)
                    .stroke_glyphs(plan.cpu_glyphs());
            }
            Pass::Fill => {
                ctx.set_paint(cpu_color(layer.paint.fill_color));
                ctx.glyph_run(&plan.face.data)
                    .font_size(plan.font_size)
                    .fill_glyphs(plan.cpu_glyphs());
            }
        }
    });
}

/// Render `layer` alone into `surfaces.isolation`.
///
/// The shadow pass draws glyphs in the shadow color and blurs them with
/// `sigma = shadow_size / 2`; stroke and fill are then source-over composited on top.
/// Layer opacity is not applied here.
pub(crate) fn paint_layer_isolated(
    ctx: &mut RenderContext,
    surfaces: &mut LayerSurfaces,
    kernels: &mut BlurKernelCache,
    plan: &GlyphPlan,
    layer: &TextLayer,
    transform: Affine,
) -> LayrResult<()> {
    clear_pixmap_to_transparent(&mut surfaces.isolation);
    if plan.is_empty() {
        return Ok(());
    }

    let has_shadow = layer.paint.shadow_size > 0.0;
    if has_shadow {
        ctx.reset();
        draw_pass(ctx, plan, layer, transform, Pass::Shadow);
        ctx.flush();
        ctx.render_to_pixmap(&mut surfaces.isolation);
        let (w, h) = (
            u32::from(surfaces.isolation.width()),
            u32::from(surfaces.isolation.height()),
        );
        let kernel = kernels.get(shadow_sigma(layer.paint.shadow_size), w.max(h))?;
        blur_rgba8_premul_in_place(surfaces.isolation.data_as_u8_slice_mut(), w, h, &kernel);
    }

    ctx.reset();
    if layer.paint.stroke_width > 0.0 {
        draw_pass(ctx, plan, layer, transform, Pass::Stroke);
    }
    draw_pass(ctx, plan, layer, transform, Pass::Fill);
    ctx.flush();

    if has_shadow {
        ctx.render_to_pixmap(&mut surfaces.scratch);
        premul_over_in_place(
            surfaces.isolation.data_as_u8_slice_mut(),
            surfaces.scratch.data_as_u8_slice(),
        );
    } else {
        ctx.render_to_pixmap(&mut surfaces.isolation);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/paint.rs"]
mod tests;
