//! Text layer record, its wire representation and field-level updates.
//!
//! A [`TextLayer`] is always fully specified: defaults are filled in when the value is created
//! or deserialized and [`TextLayer::normalized`] runs after every update, so renderers never
//! see missing or out-of-range attributes.

use serde::{Deserialize, Deserializer, Serialize};

use crate::document::blend_mode::BlendMode;
use crate::document::color::Color;
use crate::foundation::error::{LayrError, LayrResult};
use crate::foundation::math::finite_or;

/// Default text of a freshly added layer.
pub const DEFAULT_TEXT: &str = "edit";
/// Default font family of a freshly added layer.
pub const DEFAULT_FONT_FAMILY: &str = "Inter";
/// Default font size in layout units.
pub const DEFAULT_FONT_SIZE: f64 = 200.0;
/// Default font weight.
pub const DEFAULT_FONT_WEIGHT: u16 = 800;
/// Default shadow blur size.
pub const DEFAULT_SHADOW_SIZE: f64 = 4.0;
/// Default shadow color, `rgba(0, 0, 0, 0.8)`.
pub const DEFAULT_SHADOW_COLOR: Color = Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.8,
};

/// Editor slider range for letter spacing. Documented, not enforced.
pub const LETTER_SPACING_RANGE: (f64, f64) = (-20.0, 100.0);
/// Editor slider range for both tilt axes in degrees. Documented, not enforced.
pub const TILT_RANGE: (f64, f64) = (-45.0, 45.0);

/// Stable per-document layer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u64);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of the cutout a layer draws on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerGroup {
    /// Occluded by the subject.
    #[default]
    Behind,
    /// Drawn over the subject.
    Front,
}

impl LayerGroup {
    /// Lenient lookup; anything other than `front` is `behind`.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("front") {
            Self::Front
        } else {
            Self::Behind
        }
    }
}

impl<'de> Deserialize<'de> for LayerGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::from_name).unwrap_or_default())
    }
}

/// Anchor in signed percentages relative to the canvas center (+left = right, +top = up).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub left: f64,
    pub top: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Typography {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u16,
    /// Extra advance between characters; `0` keeps native shaping.
    pub letter_spacing: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub fill_color: Color,
    pub stroke_color: Color,
    pub stroke_width: f64,
    /// Group opacity applied when the layer is merged.
    pub opacity: f64,
    pub shadow_color: Color,
    pub shadow_size: f64,
    pub blend_mode: BlendMode,
}

/// Rotation and tilt are degrees, scales are positive multipliers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerTransform {
    pub rotation: f64,
    pub tilt_x: f64,
    pub tilt_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            tilt_x: 0.0,
            tilt_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

/// One user-placed piece of styled text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "TextLayerWire", from = "TextLayerWire")]
pub struct TextLayer {
    pub id: LayerId,
    /// May be empty; an empty layer draws nothing but keeps its slot.
    pub text: String,
    pub position: Position,
    pub typography: Typography,
    pub paint: Paint,
    pub transform: LayerTransform,
    pub group: LayerGroup,
}

impl TextLayer {
    /// Layer with the editor's "add text" defaults.
    pub fn new(id: LayerId) -> Self {
        Self {
            id,
            text: DEFAULT_TEXT.to_owned(),
            position: Position::default(),
            typography: Typography {
                font_family: DEFAULT_FONT_FAMILY.to_owned(),
                font_size: DEFAULT_FONT_SIZE,
                font_weight: DEFAULT_FONT_WEIGHT,
                letter_spacing: 0.0,
            },
            paint: Paint {
                fill_color: Color::WHITE,
                stroke_color: Color::BLACK,
                stroke_width: 0.0,
                opacity: 1.0,
                shadow_color: DEFAULT_SHADOW_COLOR,
                shadow_size: DEFAULT_SHADOW_SIZE,
                blend_mode: BlendMode::Normal,
            },
            transform: LayerTransform::default(),
            group: LayerGroup::Behind,
        }
    }

    /// Same layer with different text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Clamp every attribute into its valid domain.
    ///
    /// Non-finite numbers fall back to the field default. Never fails.
    pub fn normalized(mut self) -> Self {
        let pos = &mut self.position;
        pos.left = finite_or(pos.left, 0.0);
        pos.top = finite_or(pos.top, 0.0);

        let ty = &mut self.typography;
        ty.font_size = positive_or(ty.font_size, DEFAULT_FONT_SIZE);
        ty.font_weight = ty.font_weight.clamp(100, 900);
        ty.letter_spacing = finite_or(ty.letter_spacing, 0.0);
        if ty.font_family.trim().is_empty() {
            ty.font_family = DEFAULT_FONT_FAMILY.to_owned();
        }

        let paint = &mut self.paint;
        paint.stroke_width = finite_or(paint.stroke_width, 0.0).max(0.0);
        paint.shadow_size = finite_or(paint.shadow_size, 0.0).max(0.0);
        paint.opacity = finite_or(paint.opacity, 1.0).clamp(0.0, 1.0);

        let tr = &mut self.transform;
        tr.rotation = finite_or(tr.rotation, 0.0);
        tr.tilt_x = finite_or(tr.tilt_x, 0.0);
        tr.tilt_y = finite_or(tr.tilt_y, 0.0);
        tr.scale_x = positive_or(tr.scale_x, 1.0);
        tr.scale_y = positive_or(tr.scale_y, 1.0);

        self
    }

    /// True when no pass of this layer can produce pixels.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

fn positive_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { fallback }
}

fn weight_from_f64(v: f64) -> u16 {
    if v.is_finite() {
        v.round().clamp(100.0, 900.0) as u16
    } else {
        DEFAULT_FONT_WEIGHT
    }
}

/// Flat camelCase record matching the editor's JSON layer shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TextLayerWire {
    id: u64,
    text: String,
    font_family: String,
    top: f64,
    left: f64,
    color: Color,
    stroke_color: Color,
    stroke_width: f64,
    font_size: f64,
    font_weight: f64,
    opacity: f64,
    shadow_color: Color,
    shadow_size: f64,
    scale_x: f64,
    scale_y: f64,
    blend_mode: BlendMode,
    rotation: f64,
    tilt_x: f64,
    tilt_y: f64,
    letter_spacing: f64,
    layer: LayerGroup,
}

impl Default for TextLayerWire {
    fn default() -> Self {
        TextLayer::new(LayerId(0)).into()
    }
}

impl From<TextLayer> for TextLayerWire {
    fn from(l: TextLayer) -> Self {
        Self {
            id: l.id.0,
            text: l.text,
            font_family: l.typography.font_family,
            top: l.position.top,
            left: l.position.left,
            color: l.paint.fill_color,
            stroke_color: l.paint.stroke_color,
            stroke_width: l.paint.stroke_width,
            font_size: l.typography.font_size,
            font_weight: f64::from(l.typography.font_weight),
            opacity: l.paint.opacity,
            shadow_color: l.paint.shadow_color,
            shadow_size: l.paint.shadow_size,
            scale_x: l.transform.scale_x,
            scale_y: l.transform.scale_y,
            blend_mode: l.paint.blend_mode,
            rotation: l.transform.rotation,
            tilt_x: l.transform.tilt_x,
            tilt_y: l.transform.tilt_y,
            letter_spacing: l.typography.letter_spacing,
            layer: l.group,
        }
    }
}

impl From<TextLayerWire> for TextLayer {
    fn from(w: TextLayerWire) -> Self {
        TextLayer {
            id: LayerId(w.id),
            text: w.text,
            position: Position {
                left: w.left,
                top: w.top,
            },
            typography: Typography {
                font_family: w.font_family,
                font_size: w.font_size,
                font_weight: weight_from_f64(w.font_weight),
                letter_spacing: w.letter_spacing,
            },
            paint: Paint {
                fill_color: w.color,
                stroke_color: w.stroke_color,
                stroke_width: w.stroke_width,
                opacity: w.opacity,
                shadow_color: w.shadow_color,
                shadow_size: w.shadow_size,
                blend_mode: w.blend_mode,
            },
            transform: LayerTransform {
                rotation: w.rotation,
                tilt_x: w.tilt_x,
                tilt_y: w.tilt_y,
                scale_x: w.scale_x,
                scale_y: w.scale_y,
            },
            group: w.layer,
        }
        .normalized()
    }
}

/// A single editable field and its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerAttribute {
    Text(String),
    FontFamily(String),
    Top(f64),
    Left(f64),
    Color(Color),
    StrokeColor(Color),
    StrokeWidth(f64),
    FontSize(f64),
    FontWeight(f64),
    Opacity(f64),
    ShadowColor(Color),
    ShadowSize(f64),
    ScaleX(f64),
    ScaleY(f64),
    BlendMode(BlendMode),
    Rotation(f64),
    TiltX(f64),
    TiltY(f64),
    LetterSpacing(f64),
    Group(LayerGroup),
}

impl LayerAttribute {
    /// Parse an editor change event, keyed by the camelCase wire name.
    ///
    /// Numeric attributes accept JSON numbers or numeric strings (slider values arrive as
    /// either). Blend mode and group names are lenient; colors must parse.
    pub fn parse(name: &str, value: serde_json::Value) -> LayrResult<Self> {
        use serde_json::Value;

        fn num(name: &str, v: &Value) -> LayrResult<f64> {
            match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .ok_or_else(|| LayrError::validation(format!("attribute {name} expects a number")))
        }
        fn string(name: &str, v: &Value) -> LayrResult<String> {
            match v {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(LayrError::validation(format!(
                    "attribute {name} expects a string"
                ))),
            }
        }
        fn color(name: &str, v: &Value) -> LayrResult<Color> {
            Color::parse(&string(name, v)?)
        }

        let v = &value;
        Ok(match name {
            "text" => Self::Text(string(name, v)?),
            "fontFamily" => Self::FontFamily(string(name, v)?),
            "top" => Self::Top(num(name, v)?),
            "left" => Self::Left(num(name, v)?),
            "color" => Self::Color(color(name, v)?),
            "strokeColor" => Self::StrokeColor(color(name, v)?),
            "strokeWidth" => Self::StrokeWidth(num(name, v)?),
            "fontSize" => Self::FontSize(num(name, v)?),
            "fontWeight" => Self::FontWeight(num(name, v)?),
            "opacity" => Self::Opacity(num(name, v)?),
            "shadowColor" => Self::ShadowColor(color(name, v)?),
            "shadowSize" => Self::ShadowSize(num(name, v)?),
            "scaleX" => Self::ScaleX(num(name, v)?),
            "scaleY" => Self::ScaleY(num(name, v)?),
            "blendMode" => Self::BlendMode(BlendMode::from_name(&string(name, v)?)),
            "rotation" => Self::Rotation(num(name, v)?),
            "tiltX" => Self::TiltX(num(name, v)?),
            "tiltY" => Self::TiltY(num(name, v)?),
            "letterSpacing" => Self::LetterSpacing(num(name, v)?),
            "layer" => Self::Group(LayerGroup::from_name(&string(name, v)?)),
            other => {
                return Err(LayrError::validation(format!(
                    "unknown layer attribute \"{other}\""
                )));
            }
        })
    }

    /// Write this value into `layer`. Callers normalize afterwards.
    pub(crate) fn apply_to(self, layer: &mut TextLayer) {
        match self {
            Self::Text(v) => layer.text = v,
            Self::FontFamily(v) => layer.typography.font_family = v,
            Self::Top(v) => layer.position.top = v,
            Self::Left(v) => layer.position.left = v,
            Self::Color(v) => layer.paint.fill_color = v,
            Self::StrokeColor(v) => layer.paint.stroke_color = v,
            Self::StrokeWidth(v) => layer.paint.stroke_width = v,
            Self::FontSize(v) => layer.typography.font_size = v,
            Self::FontWeight(v) => layer.typography.font_weight = weight_from_f64(v),
            Self::Opacity(v) => layer.paint.opacity = v,
            Self::ShadowColor(v) => layer.paint.shadow_color = v,
            Self::ShadowSize(v) => layer.paint.shadow_size = v,
            Self::ScaleX(v) => layer.transform.scale_x = v,
            Self::ScaleY(v) => layer.transform.scale_y = v,
            Self::BlendMode(v) => layer.paint.blend_mode = v,
            Self::Rotation(v) => layer.transform.rotation = v,
            Self::TiltX(v) => layer.transform.tilt_x = v,
            Self::TiltY(v) => layer.transform.tilt_y = v,
            Self::LetterSpacing(v) => layer.typography.letter_spacing = v,
            Self::Group(v) => layer.group = v,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/layer.rs"]
mod tests;
