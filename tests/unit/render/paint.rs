use super::*;
use crate::assets::fonts::FontBook;
use crate::assets::text::TextLayoutEngine;
use crate::document::layer::LayerId;
use crate::layout::geometry::layer_transform;
use crate::layout::glyphs::plan_glyphs;

struct Fixture {
    canvas: Canvas,
    ctx: RenderContext,
    surfaces: LayerSurfaces,
    kernels: BlurKernelCache,
    engine: TextLayoutEngine,
    book: FontBook,
}

fn fixture() -> Fixture {
    let mut book = FontBook::new();
    book.add_font_file(std::path::Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data/fonts/DejaVuSans-Bold.ttf"
    )))
    .unwrap();
    let canvas = Canvas::new(160, 80).unwrap();
    let (w, h) = canvas.dims_u16();
    Fixture {
        canvas,
        ctx: RenderContext::new(w, h),
        surfaces: LayerSurfaces::new(canvas),
        kernels: BlurKernelCache::default(),
        engine: TextLayoutEngine::new(&book),
        book,
    }
}

fn layer(text: &str) -> TextLayer {
    let mut l = TextLayer::new(LayerId(1));
    l.text = text.into();
    l.typography.font_size = 40.0;
    l.paint.fill_color = Color::rgb8(255, 0, 0);
    l.paint.shadow_size = 0.0;
    l
}

fn paint(f: &mut Fixture, l: &TextLayer) {
    let face = f.book.resolve("DejaVu Sans", 700).unwrap().face;
    let plan = plan_glyphs(
        &mut f.engine,
        face,
        &l.text,
        l.typography.font_size,
        l.typography.letter_spacing,
    )
    .unwrap();
    let tr = layer_transform(l, f.canvas);
    paint_layer_isolated(&mut f.ctx, &mut f.surfaces, &mut f.kernels, &plan, l, tr).unwrap();
}

fn alpha_at(f: &Fixture, x: u32, y: u32) -> u8 {
    let i = ((y * f.canvas.width + x) * 4 + 3) as usize;
    f.surfaces.isolation.data_as_u8_slice()[i]
}

#[test]
fn scoped_restores_context_state() {
    let mut f = fixture();
    let before_tr = *f.ctx.transform();
    let before_blend = f.ctx.blend_mode();
    PaintState::scoped(&mut f.ctx, |ctx| {
        ctx.set_transform(vello_cpu::kurbo::Affine::scale(3.0));
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::new(
            vello_cpu::peniko::Mix::Multiply,
            vello_cpu::peniko::Compose::SrcOver,
        ));
        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(9.0));
    });
    assert_eq!(*f.ctx.transform(), before_tr);
    assert_eq!(f.ctx.blend_mode(), before_blend);
    assert_eq!(f.ctx.stroke().width, 1.0);
}

#[test]
fn blank_layer_clears_the_isolation_surface() {
    let mut f = fixture();
    f.surfaces.isolation.data_as_u8_slice_mut().fill(200);
    paint(&mut f, &layer(""));
    assert!(f.surfaces.isolation.data_as_u8_slice().iter().all(|&b| b == 0));
}

#[test]
fn fill_only_draws_in_fill_color_around_the_center() {
    let mut f = fixture();
    paint(&mut f, &layer("HH"));
    let data = f.surfaces.isolation.data_as_u8_slice();
    assert!(data.chunks_exact(4).any(|px| px[3] == 255));
    assert!(data.chunks_exact(4).all(|px| px[1] == 0 && px[2] == 0));
    // Corners stay empty.
    assert_eq!(alpha_at(&f, 0, 0), 0);
    assert_eq!(alpha_at(&f, 159, 79), 0);
}

#[test]
fn stroke_grows_coverage() {
    let mut f = fixture();
    paint(&mut f, &layer("HH"));
    let plain = f
        .surfaces
        .isolation
        .data_as_u8_slice()
        .chunks_exact(4)
        .filter(|px| px[3] > 0)
        .count();

    let mut stroked = layer("HH");
    stroked.paint.stroke_width = 4.0;
    stroked.paint.stroke_color = Color::rgb8(0, 0, 255);
    paint(&mut f, &stroked);
    let data = f.surfaces.isolation.data_as_u8_slice();
    let covered = data.chunks_exact(4).filter(|px| px[3] > 0).count();
    assert!(covered > plain);
    assert!(data.chunks_exact(4).any(|px| px[2] > 0));
}

#[test]
fn shadow_spreads_beyond_the_glyphs() {
    let mut f = fixture();
    paint(&mut f, &layer("HH"));
    let plain: Vec<u8> = f.surfaces.isolation.data_as_u8_slice().to_vec();

    let mut shadowed = layer("HH");
    shadowed.paint.shadow_size = 8.0;
    paint(&mut f, &shadowed);
    let data = f.surfaces.isolation.data_as_u8_slice();
    let halo = plain
        .chunks_exact(4)
        .zip(data.chunks_exact(4))
        .filter(|(p, s)| p[3] == 0 && s[3] > 0)
        .count();
    assert!(halo > 0);
    // Shadow is black, so halo pixels carry no color.
    assert!(
        plain
            .chunks_exact(4)
            .zip(data.chunks_exact(4))
            .filter(|(p, _)| p[3] == 0)
            .all(|(_, s)| s[0] == 0)
    );
}

#[test]
fn opacity_is_left_to_the_merge() {
    let mut f = fixture();
    let mut faded = layer("HH");
    faded.paint.opacity = 0.1;
    paint(&mut f, &faded);
    assert!(
        f.surfaces
            .isolation
            .data_as_u8_slice()
            .chunks_exact(4)
            .any(|px| px[3] == 255)
    );
}
