//! Separable Gaussian blur on premultiplied RGBA8 with Q16 fixed-point weights.

use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::error::{LayrError, LayrResult};

/// Canvas `shadowBlur` maps to a Gaussian with half its value as standard deviation.
pub(crate) fn shadow_sigma(shadow_blur: f64) -> f32 {
    (shadow_blur.max(0.0) / 2.0) as f32
}

/// Share of a Gaussian's mass within three standard deviations of the mean.
const THREE_SIGMA_MASS: f64 = 0.997_300_2;

/// Kernel radius covering three standard deviations, at most `max_radius`.
///
/// Taps further out than the larger surface dimension can never reach a pixel, so callers
/// pass that dimension as the cap.
pub(crate) fn radius_for_sigma(sigma: f32, max_radius: u32) -> u32 {
    if !sigma.is_finite() || sigma <= 0.0 {
        return 0;
    }
    let r = (3.0 * f64::from(sigma)).ceil();
    if r >= f64::from(max_radius) {
        max_radius
    } else {
        r as u32
    }
}

/// Q16 weights for `2 * radius + 1` taps.
///
/// When `radius` is shorter than three sigmas the taps keep the weights of the full kernel
/// instead of being renormalized, so a truncated kernel blurs exactly like the untruncated one
/// on any surface no wider than `radius`.
pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> LayrResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(LayrError::validation("blur sigma must be finite and > 0"));
    }

    let r = i64::from(radius);
    let mut weights_f = Vec::<f64>::with_capacity((2 * radius + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    let truncated = f64::from(radius) < (3.0 * sigma).ceil();
    if truncated {
        sum = (2.0 * std::f64::consts::PI).sqrt() * sigma * THREE_SIGMA_MASS;
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Rounding drift goes to the center tap so a full kernel sums to exactly 1.0.
    let delta = 65536 - acc;
    if delta != 0 && !truncated {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

/// Kernels keyed by radius and sigma bits, reused across layers and exports.
#[derive(Debug, Default)]
pub(crate) struct BlurKernelCache {
    kernels: HashMap<(u32, u32), Arc<Vec<u32>>>,
}

impl BlurKernelCache {
    /// Kernel for `sigma`, with the radius capped at `max_radius`.
    pub(crate) fn get(&mut self, sigma: f32, max_radius: u32) -> LayrResult<Arc<Vec<u32>>> {
        let radius = radius_for_sigma(sigma, max_radius);
        let key = (radius, if radius == 0 { 0 } else { sigma.to_bits() });
        if let Some(k) = self.kernels.get(&key) {
            return Ok(k.clone());
        }
        let k = Arc::new(gaussian_kernel_q16(radius, sigma)?);
        self.kernels.insert(key, k.clone());
        Ok(k)
    }
}

/// Blur `buf` in place.
///
/// Only the bounding box of non-transparent pixels, grown by the kernel radius, is processed;
/// everything outside it stays fully transparent either way. A kernel whose taps all round to
/// zero spreads the surface too thin to show and clears it.
pub(crate) fn blur_rgba8_premul_in_place(
    buf: &mut [u8],
    width: u32,
    height: u32,
    kernel_q16: &[u32],
) {
    if kernel_q16.iter().all(|&w| w == 0) {
        buf.fill(0);
        return;
    }
    if kernel_q16.len() <= 1 {
        return;
    }
    let Some((x0, y0, x1, y1)) = alpha_bounds(buf, width) else {
        return;
    };
    let radius = (kernel_q16.len() / 2) as u32;
    let x0 = x0.saturating_sub(radius);
    let y0 = y0.saturating_sub(radius);
    let x1 = (x1 + radius + 1).min(width);
    let y1 = (y1 + radius + 1).min(height);
    let (rw, rh) = (x1 - x0, y1 - y0);

    let mut region = vec![0u8; (rw as usize) * (rh as usize) * 4];
    copy_rect(buf, width, &mut region, rw, x0, y0, rh, false);
    let mut tmp = vec![0u8; region.len()];
    let mut out = vec![0u8; region.len()];
    horizontal_blur_q16(&region, &mut tmp, rw, rh, kernel_q16);
    vertical_blur_q16(&tmp, &mut out, rw, rh, kernel_q16);
    copy_rect(buf, width, &mut out, rw, x0, y0, rh, true);
}

#[allow(clippy::too_many_arguments)]
fn copy_rect(
    buf: &mut [u8],
    width: u32,
    region: &mut [u8],
    rw: u32,
    x0: u32,
    y0: u32,
    rh: u32,
    write_back: bool,
) {
    let row = (rw as usize) * 4;
    for ry in 0..rh as usize {
        let src_start = (((y0 as usize + ry) * width as usize) + x0 as usize) * 4;
        let reg = &mut region[ry * row..(ry + 1) * row];
        let full = &mut buf[src_start..src_start + row];
        if write_back {
            full.copy_from_slice(reg);
        } else {
            reg.copy_from_slice(full);
        }
    }
}

/// Inclusive bounds of pixels with non-zero alpha.
fn alpha_bounds(buf: &[u8], width: u32) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (i, px) in buf.chunks_exact(4).enumerate() {
        if px[3] == 0 {
            continue;
        }
        let x = (i as u32) % width;
        let y = (i as u32) / width;
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds
}

fn horizontal_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = x + ki as i32 - radius;
                if sx < 0 || sx >= w {
                    continue;
                }
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = y + ki as i32 - radius;
                if sy < 0 || sy >= h {
                    continue;
                }
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
