use super::*;

fn engine_and_face() -> (TextLayoutEngine, FontFace) {
    let mut book = FontBook::new();
    book.add_font_file(std::path::Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data/fonts/DejaVuSans.ttf"
    )))
    .unwrap();
    let face = book.faces()[0].as_ref().clone();
    (TextLayoutEngine::new(&book), face)
}

#[test]
fn shapes_one_glyph_per_ascii_char() {
    let (mut engine, face) = engine_and_face();
    let run = engine.shape("Hello", &face, 32.0).unwrap();
    assert_eq!(run.glyphs.len(), 5);
    assert!(run.advance > 0.0);
    assert!(run.ascent > 0.0);
    assert!(run.glyphs.windows(2).all(|w| w[1].x > w[0].x));
}

#[test]
fn advance_scales_with_size() {
    let (mut engine, face) = engine_and_face();
    let small = engine.shape("W", &face, 20.0).unwrap();
    let big = engine.shape("W", &face, 40.0).unwrap();
    assert!((big.advance - 2.0 * small.advance).abs() < 0.05);
}

#[test]
fn empty_text_is_an_empty_run() {
    let (mut engine, face) = engine_and_face();
    assert_eq!(engine.shape("", &face, 20.0).unwrap(), ShapedRun::default());
}

#[test]
fn line_breaks_stay_on_one_line() {
    let (mut engine, face) = engine_and_face();
    let run = engine.shape("a\nb", &face, 20.0).unwrap();
    assert_eq!(run.glyphs.len(), 3);
    assert!(run.glyphs.iter().all(|g| g.y == run.glyphs[0].y));
}

#[test]
fn rejects_non_positive_size() {
    let (mut engine, face) = engine_and_face();
    assert!(engine.shape("a", &face, 0.0).is_err());
    assert!(engine.shape("a", &face, f32::NAN).is_err());
}
