use std::borrow::Cow;

use crate::assets::fonts::{FontBook, FontFace};
use crate::foundation::error::{LayrError, LayrResult};

/// Glyph position relative to the start of a run; `y` is measured down from the baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ShapedGlyph {
    pub(crate) id: u32,
    pub(crate) x: f32,
    pub(crate) y: f32,
}

/// Single-line shaping result.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ShapedRun {
    pub(crate) glyphs: Vec<ShapedGlyph>,
    /// Pen advance of the whole run, trailing whitespace included.
    pub(crate) advance: f32,
    pub(crate) ascent: f32,
    pub(crate) descent: f32,
}

/// Parley contexts with every font of a [`FontBook`] registered once.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
}

impl TextLayoutEngine {
    pub(crate) fn new(book: &FontBook) -> Self {
        let mut font_ctx = parley::FontContext::default();
        for file in book.files() {
            font_ctx
                .collection
                .register_fonts(parley::fontique::Blob::from(file.as_ref().clone()), None);
        }
        Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape `text` on one line with `face` at `size_px`.
    ///
    /// Control characters and line breaks are drawn as spaces so the result is always a
    /// single line.
    pub(crate) fn shape(
        &mut self,
        text: &str,
        face: &FontFace,
        size_px: f32,
    ) -> LayrResult<ShapedRun> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(LayrError::validation("text size_px must be finite and > 0"));
        }
        if text.is_empty() {
            return Ok(ShapedRun::default());
        }

        let line: Cow<'_, str> = if text.chars().any(char::is_control) {
            Cow::Owned(
                text.chars()
                    .map(|c| if c.is_control() { ' ' } else { c })
                    .collect(),
            )
        } else {
            Cow::Borrowed(text)
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, &line, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Single(parley::style::FontFamily::Named(Cow::Owned(
                face.family.clone(),
            ))),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(face.weight)),
        ));

        let mut layout: parley::Layout<()> = builder.build(&line);
        layout.break_all_lines(None);

        let mut out = ShapedRun::default();
        for line in layout.lines() {
            let metrics = line.metrics();
            out.ascent = out.ascent.max(metrics.ascent);
            out.descent = out.descent.max(metrics.descent);
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let mut x = run.offset();
                for g in run.glyphs() {
                    out.glyphs.push(ShapedGlyph {
                        id: g.id,
                        x: x + g.x,
                        y: -g.y,
                    });
                    x += g.advance;
                }
                out.advance = out.advance.max(x);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
