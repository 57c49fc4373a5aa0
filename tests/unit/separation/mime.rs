use super::*;

#[test]
fn sniffs_supported_signatures() {
    assert_eq!(sniff_mime(b"\x89PNG\r\n\x1a\n...."), Some("image/png"));
    assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0]), Some("image/jpeg"));
    assert_eq!(sniff_mime(b"RIFF\x10\0\0\0WEBPVP8 "), Some("image/webp"));
}

#[test]
fn unknown_or_short_input_is_none() {
    assert_eq!(sniff_mime(b"GIF89a"), None);
    assert_eq!(sniff_mime(b"RIFF"), None);
    assert_eq!(sniff_mime(b""), None);
}

#[test]
fn extensions_default_to_png() {
    assert_eq!(extension_for("image/jpeg"), "jpg");
    assert_eq!(extension_for("image/webp"), "webp");
    assert_eq!(extension_for("application/octet-stream"), "png");
}
