use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert_eq!(
        LayrError::validation("bad").to_string(),
        "validation error: bad"
    );
    assert_eq!(LayrError::decode("png").to_string(), "decode error: png");
    assert_eq!(LayrError::encode("io").to_string(), "encode error: io");
    assert_eq!(LayrError::font("none").to_string(), "font error: none");
    assert_eq!(LayrError::config("x").to_string(), "config error: x");
    assert_eq!(
        LayrError::LayerNotFound(LayerId(7)).to_string(),
        "layer not found: 7"
    );
}

#[test]
fn separation_error_carries_status_and_details() {
    let err = LayrError::separation(Some(502), "upstream down");
    let LayrError::Separation { status, details } = &err else {
        panic!("expected separation error");
    };
    assert_eq!(*status, Some(502));
    assert_eq!(details, "upstream down");
    assert!(err.to_string().contains("upstream down"));
}

#[test]
fn resource_errors_are_classified() {
    assert!(LayrError::MissingPhoto.is_resource_error());
    assert!(LayrError::decode("x").is_resource_error());
    assert!(!LayrError::validation("x").is_resource_error());
}

#[test]
fn anyhow_errors_convert_transparently() {
    let err: LayrError = anyhow::anyhow!("boom").into();
    assert_eq!(err.to_string(), "boom");
}
