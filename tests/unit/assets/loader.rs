use super::*;

fn png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[tokio::test]
async fn missing_photo_is_reported() {
    let err = ResourceLoader::new().load(&Document::new()).await.unwrap_err();
    assert!(matches!(err, LayrError::MissingPhoto));
}

#[tokio::test]
async fn loads_photo_and_cutout() {
    let mut doc = Document::new();
    doc.set_photo(EncodedImage::new(png(4, 3, [255, 0, 0, 255])));
    doc.set_cutout(EncodedImage::new(png(4, 3, [0, 0, 255, 128])));

    let res = ResourceLoader::new().load(&doc).await.unwrap();
    assert_eq!((res.photo.width(), res.photo.height()), (4, 3));
    let cutout = res.cutout.unwrap();
    assert_eq!(cutout.prepared().rgba8_premul[3], 128);
}

#[tokio::test]
async fn bad_cutout_aborts_the_whole_load() {
    let mut doc = Document::new();
    doc.set_photo(EncodedImage::new(png(2, 2, [0, 0, 0, 255])));
    doc.set_cutout(EncodedImage::new(vec![0u8; 16]));

    let err = ResourceLoader::new().load(&doc).await.unwrap_err();
    match err {
        LayrError::Decode(msg) => assert!(msg.starts_with("cutout: "), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn blocking_load_matches_async_contract() {
    let mut doc = Document::new();
    doc.set_photo(EncodedImage::new(png(2, 2, [0, 255, 0, 255])));
    let res = ResourceLoader::new().load_blocking(&doc).unwrap();
    assert!(res.cutout.is_none());
    assert_eq!(res.photo.prepared().rgba8_premul[1], 255);
}
