use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{LayrError, LayrResult};

/// Straight-alpha color with unit-interval channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red in `0..=1`.
    pub r: f64,
    /// Green in `0..=1`.
    pub g: f64,
    /// Blue in `0..=1`.
    pub b: f64,
    /// Alpha in `0..=1`.
    pub a: f64,
}

impl Color {
    /// Build a color, clamping every channel into `0..=1`.
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        fn unit(x: f64) -> f64 {
            if x.is_finite() { x.clamp(0.0, 1.0) } else { 0.0 }
        }
        Self {
            r: unit(r),
            g: unit(g),
            b: unit(b),
            a: unit(a),
        }
    }

    /// Opaque color from 8-bit channels.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba8(r, g, b, 255)
    }

    /// Color from 8-bit straight-alpha channels.
    pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            f64::from(a) / 255.0,
        )
    }

    /// Opaque white.
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    /// Opaque black.
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    /// Parse CSS color syntax (hex, `rgb[a]()`, `hsl[a]()`, named colors, `transparent`).
    pub fn parse(input: &str) -> LayrResult<Self> {
        let s = input.trim().to_ascii_lowercase();
        if s.is_empty() {
            return Err(LayrError::validation("empty color"));
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex)
                .ok_or_else(|| LayrError::validation(format!("invalid hex color \"{input}\"")));
        }
        if let Some((func, args)) = split_function(&s) {
            let parsed = match func {
                "rgb" | "rgba" => parse_rgb_args(args),
                "hsl" | "hsla" => parse_hsl_args(args),
                _ => None,
            };
            return parsed.ok_or_else(|| {
                LayrError::validation(format!("invalid color function \"{input}\""))
            });
        }
        if s == "transparent" {
            return Ok(Self::TRANSPARENT);
        }
        named(&s)
            .map(|(r, g, b)| Self::rgb8(r, g, b))
            .ok_or_else(|| LayrError::validation(format!("unknown color \"{input}\"")))
    }

    /// Straight 8-bit channels, rounded.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }

    /// Premultiplied 8-bit channels.
    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        let [r, g, b, a] = self.to_rgba8();
        Rgba8Premul::from_straight_rgba(r, g, b, a)
    }

    /// CSS serialization used for round-tripping documents.
    pub fn to_css(self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl FromStr for Color {
    type Err = LayrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Color::rgb8(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Color::rgba8(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Color::rgb8(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn split_function(s: &str) -> Option<(&str, &str)> {
    let open = s.find('(')?;
    let inner = s[open + 1..].strip_suffix(')')?;
    Some((s[..open].trim(), inner))
}

/// Split `a, b, c` / `a b c / d` argument lists into components plus optional alpha.
fn split_args(args: &str) -> Option<(Vec<&str>, Option<&str>)> {
    let (main, slash_alpha) = match args.split_once('/') {
        Some((m, a)) => (m, Some(a.trim())),
        None => (args, None),
    };
    let parts: Vec<&str> = if main.contains(',') {
        main.split(',').map(str::trim).collect()
    } else {
        main.split_whitespace().collect()
    };
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    match (parts.len(), slash_alpha) {
        (3, alpha) => Some((parts, alpha)),
        (4, None) => {
            let alpha = parts[3];
            Some((parts[..3].to_vec(), Some(alpha)))
        }
        _ => None,
    }
}

fn parse_alpha(s: Option<&str>) -> Option<f64> {
    match s {
        None => Some(1.0),
        Some(v) => match v.strip_suffix('%') {
            Some(p) => p.trim().parse::<f64>().ok().map(|x| x / 100.0),
            None => v.parse::<f64>().ok(),
        },
    }
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let (parts, alpha) = split_args(args)?;
    let channel = |s: &str| -> Option<f64> {
        match s.strip_suffix('%') {
            Some(p) => p.trim().parse::<f64>().ok().map(|x| x / 100.0),
            None => s.parse::<f64>().ok().map(|x| x / 255.0),
        }
    };
    Some(Color::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        parse_alpha(alpha)?,
    ))
}

fn parse_hsl_args(args: &str) -> Option<Color> {
    let (parts, alpha) = split_args(args)?;
    let hue = parts[0].strip_suffix("deg").unwrap_or(parts[0]).parse::<f64>().ok()?;
    let pct = |s: &str| -> Option<f64> {
        s.strip_suffix('%')
            .unwrap_or(s)
            .trim()
            .parse::<f64>()
            .ok()
            .map(|x| x / 100.0)
    };
    Some(hsla_to_rgba(hue, pct(parts[1])?, pct(parts[2])?, parse_alpha(alpha)?))
}

fn hsla_to_rgba(h: f64, s: f64, l: f64, a: f64) -> Color {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return Color::rgba(l, l, l, a);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    Color::rgba(
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
        a,
    )
}

fn named(name: &str) -> Option<(u8, u8, u8)> {
    const NAMED: &[(&str, (u8, u8, u8))] = &[
        ("black", (0, 0, 0)),
        ("white", (255, 255, 255)),
        ("red", (255, 0, 0)),
        ("lime", (0, 255, 0)),
        ("green", (0, 128, 0)),
        ("blue", (0, 0, 255)),
        ("yellow", (255, 255, 0)),
        ("cyan", (0, 255, 255)),
        ("aqua", (0, 255, 255)),
        ("magenta", (255, 0, 255)),
        ("fuchsia", (255, 0, 255)),
        ("gray", (128, 128, 128)),
        ("grey", (128, 128, 128)),
        ("silver", (192, 192, 192)),
        ("maroon", (128, 0, 0)),
        ("olive", (128, 128, 0)),
        ("purple", (128, 0, 128)),
        ("teal", (0, 128, 128)),
        ("navy", (0, 0, 128)),
        ("orange", (255, 165, 0)),
        ("pink", (255, 192, 203)),
        ("hotpink", (255, 105, 180)),
        ("gold", (255, 215, 0)),
        ("brown", (165, 42, 42)),
        ("coral", (255, 127, 80)),
        ("crimson", (220, 20, 60)),
        ("indigo", (75, 0, 130)),
        ("violet", (238, 130, 238)),
        ("tomato", (255, 99, 71)),
        ("salmon", (250, 128, 114)),
        ("khaki", (240, 230, 140)),
        ("beige", (245, 245, 220)),
        ("ivory", (255, 255, 240)),
        ("lavender", (230, 230, 250)),
        ("turquoise", (64, 224, 208)),
        ("skyblue", (135, 206, 235)),
        ("royalblue", (65, 105, 225)),
        ("steelblue", (70, 130, 180)),
        ("slategray", (112, 128, 144)),
        ("darkgray", (169, 169, 169)),
        ("lightgray", (211, 211, 211)),
        ("whitesmoke", (245, 245, 245)),
    ];
    NAMED.iter().find(|(n, _)| *n == name).map(|(_, rgb)| *rgb)
}

#[cfg(test)]
#[path = "../../tests/unit/document/color.rs"]
mod tests;
