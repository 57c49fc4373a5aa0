use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Closed set of layer merge operators (W3C compositing names).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// Plain source-over.
    #[default]
    Normal,
    /// `multiply`
    Multiply,
    /// `screen`
    Screen,
    /// `overlay`
    Overlay,
    /// `darken`
    Darken,
    /// `lighten`
    Lighten,
    /// `color-dodge`
    ColorDodge,
    /// `color-burn`
    ColorBurn,
    /// `hard-light`
    HardLight,
    /// `soft-light`
    SoftLight,
    /// `difference`
    Difference,
    /// `exclusion`
    Exclusion,
    /// `hue` (non-separable)
    Hue,
    /// `saturation` (non-separable)
    Saturation,
    /// `color` (non-separable)
    Color,
    /// `luminosity` (non-separable)
    Luminosity,
}

/// Every mode paired with its wire name.
pub(crate) const BLEND_MODE_NAMES: [(BlendMode, &str); 16] = [
    (BlendMode::Normal, "normal"),
    (BlendMode::Multiply, "multiply"),
    (BlendMode::Screen, "screen"),
    (BlendMode::Overlay, "overlay"),
    (BlendMode::Darken, "darken"),
    (BlendMode::Lighten, "lighten"),
    (BlendMode::ColorDodge, "color-dodge"),
    (BlendMode::ColorBurn, "color-burn"),
    (BlendMode::HardLight, "hard-light"),
    (BlendMode::SoftLight, "soft-light"),
    (BlendMode::Difference, "difference"),
    (BlendMode::Exclusion, "exclusion"),
    (BlendMode::Hue, "hue"),
    (BlendMode::Saturation, "saturation"),
    (BlendMode::Color, "color"),
    (BlendMode::Luminosity, "luminosity"),
];

impl BlendMode {
    /// Look up a mode by name. Unknown names resolve to [`BlendMode::Normal`].
    ///
    /// Matching ignores ASCII case, surrounding whitespace and `_` vs `-`, so `"Color_Dodge"`
    /// and `"color-dodge"` are the same mode.
    pub fn from_name(name: &str) -> Self {
        let key = name.trim().to_ascii_lowercase().replace('_', "-");
        BLEND_MODE_NAMES
            .iter()
            .find(|(_, n)| *n == key)
            .map(|(m, _)| *m)
            .unwrap_or_else(|| {
                tracing::debug!(name, "unknown blend mode, using normal");
                Self::Normal
            })
    }

    /// Canonical wire name.
    pub fn name(self) -> &'static str {
        BLEND_MODE_NAMES
            .iter()
            .find(|(m, _)| *m == self)
            .map(|(_, n)| *n)
            .unwrap_or("normal")
    }

    /// Hue, saturation, color and luminosity operate on the whole RGB triple.
    pub fn is_non_separable(self) -> bool {
        matches!(
            self,
            Self::Hue | Self::Saturation | Self::Color | Self::Luminosity
        )
    }
}

impl std::fmt::Display for BlendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for BlendMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for BlendMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::from_name).unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/blend_mode.rs"]
mod tests;
