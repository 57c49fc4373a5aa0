use super::*;
use crate::encode::sink::InMemorySink;
use async_trait::async_trait;

fn fonts() -> FontBook {
    let mut book = FontBook::new();
    book.add_font_file(std::path::Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data/fonts/DejaVuSans.ttf"
    )))
    .unwrap();
    book
}

fn png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

struct Failing;

#[async_trait]
impl BackgroundRemover for Failing {
    async fn remove_background(&self, _image: EncodedImage) -> LayrResult<EncodedImage> {
        Err(LayrError::separation(Some(503), "busy"))
    }
}

struct Solid([u8; 4]);

#[async_trait]
impl BackgroundRemover for Solid {
    async fn remove_background(&self, image: EncodedImage) -> LayrResult<EncodedImage> {
        let photo = crate::assets::decode::decode_image(&image.bytes)?;
        Ok(EncodedImage::new(png(photo.width, photo.height, self.0)).with_mime("image/png"))
    }
}

#[tokio::test]
async fn oversized_upload_is_refused_before_touching_the_document() {
    let opts = EditorSessionOpts {
        max_upload_bytes: 10,
        ..EditorSessionOpts::default()
    };
    let mut s = EditorSession::new(fonts(), opts).unwrap();
    let err = s.upload(EncodedImage::new(vec![0u8; 11])).await.unwrap_err();
    assert!(matches!(err, LayrError::Validation(_)));
    assert!(s.document().photo().is_none());
}

#[tokio::test]
async fn failed_separation_keeps_photo_without_cutout() {
    let mut s = EditorSession::new(fonts(), EditorSessionOpts::default())
        .unwrap()
        .with_remover(Arc::new(Failing));
    let err = s
        .upload(EncodedImage::new(png(8, 8, [0, 0, 0, 255])))
        .await
        .unwrap_err();
    assert!(matches!(err, LayrError::Separation { status: Some(503), .. }));
    assert!(s.document().photo().is_some());
    assert!(s.document().cutout().is_none());

    s.set_preview_size(PreviewSize::new(8.0, 8.0));
    let frame = s.preview().await.unwrap();
    assert_eq!((frame.width, frame.height), (8, 8));
}

#[tokio::test]
async fn successful_separation_installs_cutout() {
    let mut s = EditorSession::new(fonts(), EditorSessionOpts::default())
        .unwrap()
        .with_remover(Arc::new(Solid([0, 255, 0, 255])));
    s.upload(EncodedImage::new(png(6, 4, [255, 0, 0, 255])))
        .await
        .unwrap();
    assert!(s.document().cutout().is_some());

    let frame = s.render_export().await.unwrap();
    assert_eq!(frame.pixel(3, 2), Some([0, 255, 0, 255]));
}

#[tokio::test]
async fn preview_needs_a_measured_size() {
    let mut s = EditorSession::new(fonts(), EditorSessionOpts::default()).unwrap();
    s.upload(EncodedImage::new(png(4, 4, [0, 0, 0, 255])))
        .await
        .unwrap();
    assert!(matches!(
        s.preview().await,
        Err(LayrError::Validation(_))
    ));
}

#[tokio::test]
async fn export_without_photo_fails_and_saves_nothing() {
    let mut s = EditorSession::new(fonts(), EditorSessionOpts::default()).unwrap();
    let mut sink = InMemorySink::new();
    assert!(matches!(
        s.export(&mut sink).await,
        Err(LayrError::MissingPhoto)
    ));
    assert!(sink.saved.is_empty());
}

#[tokio::test]
async fn export_is_named_after_the_app() {
    let opts = EditorSessionOpts {
        app_name: "Text Behind Image".into(),
        ..EditorSessionOpts::default()
    };
    let mut s = EditorSession::new(fonts(), opts).unwrap();
    s.upload(EncodedImage::new(png(10, 10, [9, 9, 9, 255])))
        .await
        .unwrap();
    let mut sink = InMemorySink::new();
    let saved = s.export(&mut sink).await.unwrap();
    assert_eq!(saved.file_name, "text-behind-image.png");
    let (_, bytes) = sink.last().unwrap();
    let img = image::load_from_memory(bytes).unwrap();
    assert_eq!((img.width(), img.height()), (10, 10));
}

#[test]
fn opts_follow_config() {
    let mut config = LayrConfig::default();
    config.app.name = "Other".into();
    config.upload.max_bytes = 5;
    let opts = EditorSessionOpts::from(&config);
    assert_eq!(opts.app_name, "Other");
    assert_eq!(opts.max_upload_bytes, 5);
}

#[test]
fn config_without_fonts_cannot_build_a_session() {
    assert!(matches!(
        EditorSession::from_config(&LayrConfig::default()),
        Err(LayrError::Font(_))
    ));
}
