use super::*;

fn merge(dst: [u8; 4], src: [u8; 4], opacity: f32, mode: BlendMode) -> [u8; 4] {
    let mut d = dst;
    composite_over_rgba8_premul(&mut d, &src, opacity, mode).unwrap();
    d
}

const WHITE: [u8; 4] = [255, 255, 255, 255];

#[test]
fn normal_over_opaque_replaces() {
    assert_eq!(merge(WHITE, [255, 0, 0, 255], 1.0, BlendMode::Normal), [255, 0, 0, 255]);
}

#[test]
fn opacity_scales_source() {
    let out = merge([0, 0, 0, 255], [255, 255, 255, 255], 0.5, BlendMode::Normal);
    assert!(out[0].abs_diff(128) <= 1, "{out:?}");
    assert_eq!(out[3], 255);
}

#[test]
fn zero_opacity_leaves_target() {
    assert_eq!(merge(WHITE, [255, 0, 0, 255], 0.0, BlendMode::Multiply), WHITE);
}

#[test]
fn multiply_with_white_is_identity_on_source() {
    let out = merge(WHITE, [200, 50, 0, 255], 1.0, BlendMode::Multiply);
    assert_eq!(out, [200, 50, 0, 255]);
}

#[test]
fn multiply_darkens() {
    let out = merge([128, 128, 128, 255], [128, 255, 0, 255], 1.0, BlendMode::Multiply);
    assert!(out[0].abs_diff(64) <= 1);
    assert!(out[1].abs_diff(128) <= 1);
    assert_eq!(out[2], 0);
}

#[test]
fn screen_lightens() {
    let out = merge([128, 0, 0, 255], [128, 0, 0, 255], 1.0, BlendMode::Screen);
    assert!(out[0].abs_diff(192) <= 1, "{out:?}");
}

#[test]
fn difference_of_equal_colors_is_black() {
    let out = merge([90, 90, 90, 255], [90, 90, 90, 255], 1.0, BlendMode::Difference);
    assert_eq!(&out[..3], &[0, 0, 0]);
}

#[test]
fn blend_over_transparent_target_is_plain_source() {
    for (mode, _) in crate::document::blend_mode::BLEND_MODE_NAMES {
        let out = merge([0, 0, 0, 0], [100, 50, 25, 255], 1.0, mode);
        assert_eq!(out, [100, 50, 25, 255], "{mode}");
    }
}

#[test]
fn luminosity_keeps_target_hue() {
    let out = merge([255, 0, 0, 255], [128, 128, 128, 255], 1.0, BlendMode::Luminosity);
    assert!(out[0] > out[1] && out[0] > out[2], "{out:?}");
}

#[test]
fn every_mode_has_a_kernel_and_only_normal_is_source_over() {
    for (mode, _) in crate::document::blend_mode::BLEND_MODE_NAMES {
        let is_over = matches!(kernel_for(mode), BlendKernel::SourceOver);
        assert_eq!(is_over, mode == BlendMode::Normal, "{mode}");
        let non_sep = matches!(kernel_for(mode), BlendKernel::NonSeparable(_));
        assert_eq!(non_sep, mode.is_non_separable(), "{mode}");
    }
}

#[test]
fn length_mismatch_is_rejected() {
    let mut d = [0u8; 8];
    assert!(composite_over_rgba8_premul(&mut d, &[0u8; 4], 1.0, BlendMode::Normal).is_err());
}

#[test]
fn premul_over_half_alpha() {
    let mut d = [0, 0, 255, 255];
    premul_over_in_place(&mut d, &[128, 0, 0, 128]);
    assert_eq!(d[0], 128);
    assert!(d[2].abs_diff(127) <= 1);
    assert_eq!(d[3], 255);
}
