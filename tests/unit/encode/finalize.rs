use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::error::LayrError;

#[test]
fn file_name_is_a_slug() {
    assert_eq!(export_file_name("Layr"), "layr.png");
    assert_eq!(export_file_name("  Text  Behind\tImage "), "text-behind-image.png");
    assert_eq!(export_file_name(""), "export.png");
}

#[test]
fn finalize_encodes_then_saves() {
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![255, 0, 0, 255],
        premultiplied: true,
    };
    let mut sink = InMemorySink::new();
    let saved = finalize(&frame, "Layr", &mut sink).unwrap();
    assert_eq!(saved.file_name, "layr.png");
    let (_, bytes) = sink.last().unwrap();
    assert_eq!(bytes.len(), saved.bytes);
    assert!(bytes.starts_with(b"\x89PNG"));
}

#[test]
fn failed_encode_never_reaches_the_sink() {
    let frame = FrameRGBA {
        width: 4,
        height: 4,
        data: vec![0; 3],
        premultiplied: true,
    };
    let mut sink = InMemorySink::new();
    assert!(matches!(
        finalize(&frame, "Layr", &mut sink),
        Err(LayrError::Encode(_))
    ));
    assert!(sink.saved.is_empty());
}
