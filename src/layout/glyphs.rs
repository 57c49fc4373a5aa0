use std::sync::Arc;

use crate::assets::fonts::FontFace;
use crate::assets::text::{ShapedRun, TextLayoutEngine};
use crate::foundation::error::LayrResult;

/// Glyph in layer space: the anchor is the origin, `y` points down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// Every glyph of one layer, centered on the anchor.
#[derive(Clone, Debug)]
pub struct GlyphPlan {
    pub glyphs: Vec<PlacedGlyph>,
    /// Total horizontal extent including letter spacing.
    pub width: f64,
    pub font_size: f32,
    pub face: Arc<FontFace>,
}

impl GlyphPlan {
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Glyphs in rasterizer form.
    pub(crate) fn cpu_glyphs(&self) -> impl Iterator<Item = vello_cpu::Glyph> + Clone + '_ {
        self.glyphs.iter().map(|g| vello_cpu::Glyph {
            id: g.id,
            x: g.x,
            y: g.y,
        })
    }
}

/// Left edge of every character and the total width for spaced text.
///
/// `total = sum(advances) + (n - 1) * spacing`, and the first character starts at `-total / 2`.
pub fn spaced_origins(advances: &[f64], spacing: f64) -> (Vec<f64>, f64) {
    if advances.is_empty() {
        return (Vec::new(), 0.0);
    }
    let gaps = (advances.len() - 1) as f64;
    let total = advances.iter().sum::<f64>() + gaps * spacing;
    let mut x = -total / 2.0;
    let mut origins = Vec::with_capacity(advances.len());
    for adv in advances {
        origins.push(x);
        x += adv + spacing;
    }
    (origins, total)
}

/// Baseline offset that puts the middle of the em box on the anchor.
pub fn middle_baseline(ascent: f32, descent: f32) -> f32 {
    (ascent - descent) / 2.0
}

/// Shape and place `text` for drawing with `face`.
///
/// With zero letter spacing the text is shaped as one run (kerning and ligatures apply).
/// Otherwise every character is shaped alone and laid out with `letter_spacing` between
/// neighbours. Font size is clamped to at least 1px.
pub(crate) fn plan_glyphs(
    engine: &mut TextLayoutEngine,
    face: Arc<FontFace>,
    text: &str,
    font_size: f64,
    letter_spacing: f64,
) -> LayrResult<GlyphPlan> {
    let font_size = font_size.max(1.0) as f32;
    let mut plan = GlyphPlan {
        glyphs: Vec::new(),
        width: 0.0,
        font_size,
        face,
    };
    if text.is_empty() {
        return Ok(plan);
    }

    if letter_spacing == 0.0 {
        let run = engine.shape(text, &plan.face, font_size)?;
        let origin = -f64::from(run.advance) / 2.0;
        plan.width = f64::from(run.advance);
        push_run(&mut plan.glyphs, &run, origin);
        return Ok(plan);
    }

    let runs = text
        .chars()
        .map(|c| {
            let mut buf = [0u8; 4];
            engine.shape(c.encode_utf8(&mut buf), &plan.face, font_size)
        })
        .collect::<LayrResult<Vec<ShapedRun>>>()?;
    let advances: Vec<f64> = runs.iter().map(|r| f64::from(r.advance)).collect();
    let (origins, total) = spaced_origins(&advances, letter_spacing);
    plan.width = total;
    for (run, origin) in runs.iter().zip(origins) {
        push_run(&mut plan.glyphs, run, origin);
    }
    Ok(plan)
}

fn push_run(out: &mut Vec<PlacedGlyph>, run: &ShapedRun, origin: f64) {
    let baseline = middle_baseline(run.ascent, run.descent);
    out.extend(run.glyphs.iter().map(|g| PlacedGlyph {
        id: g.id,
        x: (origin + f64::from(g.x)) as f32,
        y: baseline + g.y,
    }));
}

#[cfg(test)]
#[path = "../../tests/unit/layout/glyphs.rs"]
mod tests;
