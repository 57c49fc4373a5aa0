//! Merge kernels for premultiplied RGBA8 surfaces.
//!
//! Every [`BlendMode`] maps to one [`BlendKernel`] through [`kernel_for`]; behind and front
//! layers go through the same table. Blending uses the W3C compositing model: the blend
//! function sees unpremultiplied colors and the result is source-over composited.

use crate::document::blend_mode::BlendMode;
use crate::foundation::error::{LayrError, LayrResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u8};

type Rgb = [f32; 3];

/// Compositing function for one blend mode.
#[derive(Clone, Copy)]
pub(crate) enum BlendKernel {
    /// Plain premultiplied source-over, integer path.
    SourceOver,
    /// Per-channel `B(src, dst)`.
    Separable(fn(f32, f32) -> f32),
    /// Whole-triple `B(src, dst)`.
    NonSeparable(fn(Rgb, Rgb) -> Rgb),
}

pub(crate) fn kernel_for(mode: BlendMode) -> BlendKernel {
    use BlendKernel::{NonSeparable, Separable, SourceOver};
    match mode {
        BlendMode::Normal => SourceOver,
        BlendMode::Multiply => Separable(|s, d| s * d),
        BlendMode::Screen => Separable(|s, d| s + d - s * d),
        BlendMode::Overlay => Separable(|s, d| hard_light(d, s)),
        BlendMode::Darken => Separable(|s, d| s.min(d)),
        BlendMode::Lighten => Separable(|s, d| s.max(d)),
        BlendMode::ColorDodge => Separable(|s, d| {
            if d <= 0.0 {
                0.0
            } else if s >= 1.0 {
                1.0
            } else {
                (d / (1.0 - s)).min(1.0)
            }
        }),
        BlendMode::ColorBurn => Separable(|s, d| {
            if d >= 1.0 {
                1.0
            } else if s <= 0.0 {
                0.0
            } else {
                1.0 - ((1.0 - d) / s).min(1.0)
            }
        }),
        BlendMode::HardLight => Separable(hard_light),
        BlendMode::SoftLight => Separable(|s, d| {
            if s <= 0.5 {
                d - (1.0 - 2.0 * s) * d * (1.0 - d)
            } else {
                let g = if d <= 0.25 {
                    ((16.0 * d - 12.0) * d + 4.0) * d
                } else {
                    d.sqrt()
                };
                d + (2.0 * s - 1.0) * (g - d)
            }
        }),
        BlendMode::Difference => Separable(|s, d| (d - s).abs()),
        BlendMode::Exclusion => Separable(|s, d| d + s - 2.0 * d * s),
        BlendMode::Hue => NonSeparable(|s, d| set_lum(set_sat(s, sat(d)), lum(d))),
        BlendMode::Saturation => NonSeparable(|s, d| set_lum(set_sat(d, sat(s)), lum(d))),
        BlendMode::Color => NonSeparable(|s, d| set_lum(s, lum(d))),
        BlendMode::Luminosity => NonSeparable(|s, d| set_lum(d, lum(s))),
    }
}

fn hard_light(s: f32, d: f32) -> f32 {
    if s <= 0.5 {
        2.0 * s * d
    } else {
        1.0 - 2.0 * (1.0 - s) * (1.0 - d)
    }
}

fn lum(c: Rgb) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: Rgb) -> Rgb {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 && l - n > f32::EPSILON {
        for ch in &mut out {
            *ch = l + (*ch - l) * l / (l - n);
        }
    }
    if x > 1.0 && x - l > f32::EPSILON {
        for ch in &mut out {
            *ch = l + (*ch - l) * (1.0 - l) / (x - l);
        }
    }
    out
}

fn set_lum(c: Rgb, l: f32) -> Rgb {
    let d = l - lum(c);
    clip_color([c[0] + d, c[1] + d, c[2] + d])
}

fn sat(c: Rgb) -> f32 {
    c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2])
}

fn set_sat(c: Rgb, s: f32) -> Rgb {
    let mut idx = [0usize, 1, 2];
    idx.sort_by(|&a, &b| c[a].total_cmp(&c[b]));
    let [min, mid, max] = idx;
    let mut out = [0.0f32; 3];
    if c[max] > c[min] {
        out[mid] = (c[mid] - c[min]) * s / (c[max] - c[min]);
        out[max] = s;
    }
    out
}

/// Merge `src` onto `dst` (both premultiplied RGBA8, same size) with group `opacity`.
pub(crate) fn composite_over_rgba8_premul(
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
    mode: BlendMode,
) -> LayrResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(LayrError::validation(
            "composite_over_rgba8_premul expects equal-length rgba8 buffers",
        ));
    }

    // Dispatch once per merge, not per pixel.
    match kernel_for(mode) {
        BlendKernel::SourceOver => premul_over_in_place_opacity(dst, src, opacity),
        BlendKernel::Separable(f) => composite_over_rgba8_premul_blend(dst, src, opacity, |s, d| {
            [f(s[0], d[0]), f(s[1], d[1]), f(s[2], d[2])]
        }),
        BlendKernel::NonSeparable(f) => composite_over_rgba8_premul_blend(dst, src, opacity, f),
    }
    Ok(())
}

pub(crate) fn premul_over_in_place_opacity(dst: &mut [u8], src: &[u8], opacity: f32) {
    let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
    if op == 0 {
        return;
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = mul_div255_u8(u16::from(s[3]), op);
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - u16::from(sa);

        d[3] = add_sat_u8(sa, mul_div255_u8(u16::from(d[3]), inv));
        for c in 0..3 {
            let sc = mul_div255_u8(u16::from(s[c]), op);
            let dc = mul_div255_u8(u16::from(d[c]), inv);
            d[c] = add_sat_u8(sc, dc);
        }
    }
}

/// Full-strength premultiplied source-over.
pub(crate) fn premul_over_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = s[3] as u16;
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - sa;
        d[3] = add_sat_u8(sa as u8, mul_div255_u8(d[3] as u16, inv));
        for c in 0..3 {
            let dc = mul_div255_u8(d[c] as u16, inv);
            d[c] = add_sat_u8(s[c], dc);
        }
    }
}

#[inline(always)]
fn composite_over_rgba8_premul_blend<F>(dst: &mut [u8], src: &[u8], opacity: f32, blend_fn: F)
where
    F: Fn(Rgb, Rgb) -> Rgb,
{
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        // out_a = sa + da * (1 - sa)
        // out_p = sp * (1 - da) + dp * (1 - sa) + B(sc, dc) * sa * da
        let sa = (s[3] as f32 / 255.0) * opacity;
        let da = d[3] as f32 / 255.0;
        let sp = [0usize, 1, 2].map(|c| (s[c] as f32 / 255.0) * opacity);
        let dp = [0usize, 1, 2].map(|c| d[c] as f32 / 255.0);

        let sc = sp.map(|p| if sa > 0.0 { (p / sa).clamp(0.0, 1.0) } else { 0.0 });
        let dc = dp.map(|p| if da > 0.0 { (p / da).clamp(0.0, 1.0) } else { 0.0 });
        let b = blend_fn(sc, dc).map(|x| x.clamp(0.0, 1.0));

        let out_a = (sa + da * (1.0 - sa)).clamp(0.0, 1.0);
        for c in 0..3 {
            let out_p = (sp[c] * (1.0 - da) + dp[c] * (1.0 - sa) + b[c] * sa * da).clamp(0.0, 1.0);
            d[c] = (out_p * 255.0).round() as u8;
        }
        d[3] = (out_a * 255.0).round() as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
