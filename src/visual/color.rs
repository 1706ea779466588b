//! Color slots: a solid color and a two-stop gradient kept side by side.

use std::fmt;
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use super::ParseEnumError;

/// Icon color the service applies when none is requested.
pub const DEFAULT_ICON_COLOR: &str = "white";

/// Default first gradient stop.
pub const DEFAULT_GRADIENT_START: &str = "#7B68EE";

/// Default second gradient stop.
pub const DEFAULT_GRADIENT_END: &str = "#FF1493";

// ============================================================================
// GradientDirection
// ============================================================================

/// Direction of a two-stop linear gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum GradientDirection {
    #[default]
    Horizontal,
    Vertical,
    Diagonal,
}

impl GradientDirection {
    /// Every direction in cycling order.
    pub const ALL: [Self; 3] = [Self::Horizontal, Self::Vertical, Self::Diagonal];

    /// The direction after this one, wrapping back to the start.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Diagonal => "diagonal",
        }
    }

    /// Arrow used when displaying the direction.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Horizontal => "→",
            Self::Vertical => "↓",
            Self::Diagonal => "↘",
        }
    }
}

impl fmt::Display for GradientDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradientDirection {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError::new("gradient direction", s))
    }
}

// ============================================================================
// Gradient
// ============================================================================

/// A two-stop linear gradient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gradient {
    pub start: String,
    pub end: String,
    pub direction: GradientDirection,
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            start: DEFAULT_GRADIENT_START.to_string(),
            end: DEFAULT_GRADIENT_END.to_string(),
            direction: GradientDirection::default(),
        }
    }
}

impl Gradient {
    /// Paired-stop wire encoding, `(start,end)`.
    ///
    /// The direction travels in its own field.
    pub fn encode(&self) -> String {
        format!("({},{})", self.start.trim(), self.end.trim())
    }
}

/// What a slot currently paints with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint<'a> {
    Solid(&'a str),
    Gradient(&'a Gradient),
}

// ============================================================================
// ColorSlot
// ============================================================================

/// A color setting that can be either solid or a gradient.
///
/// Both values are stored at all times. Flipping between modes never
/// discards the other mode's values, so the user can toggle freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSlot {
    solid: String,
    gradient: Gradient,
    use_gradient: bool,
}

impl ColorSlot {
    /// Creates a slot in solid mode with the given solid color.
    pub fn new(solid: impl Into<String>) -> Self {
        Self {
            solid: solid.into(),
            gradient: Gradient::default(),
            use_gradient: false,
        }
    }

    /// Stored solid color (may be empty).
    pub fn solid(&self) -> &str {
        &self.solid
    }

    /// Stored gradient.
    pub fn gradient(&self) -> &Gradient {
        &self.gradient
    }

    /// Returns true when gradient mode is selected.
    pub fn is_gradient(&self) -> bool {
        self.use_gradient
    }

    /// Sets the solid color. Returns true if it changed.
    pub fn set_solid(&mut self, value: impl Into<String>) -> bool {
        replace_if_changed(&mut self.solid, value.into())
    }

    /// Sets both gradient stops. Returns true if either changed.
    pub fn set_stops(&mut self, start: impl Into<String>, end: impl Into<String>) -> bool {
        let a = replace_if_changed(&mut self.gradient.start, start.into());
        let b = replace_if_changed(&mut self.gradient.end, end.into());
        a || b
    }

    /// Selects gradient or solid mode. Returns true if the mode changed.
    pub fn set_gradient_enabled(&mut self, enabled: bool) -> bool {
        if self.use_gradient != enabled {
            self.use_gradient = enabled;
            true
        } else {
            false
        }
    }

    /// Sets the gradient direction.
    pub fn set_direction(&mut self, direction: GradientDirection) {
        self.gradient.direction = direction;
    }

    /// Advances the gradient direction and returns the new value.
    pub fn cycle_direction(&mut self) -> GradientDirection {
        self.gradient.direction = self.gradient.direction.next();
        self.gradient.direction
    }

    /// The paint to request, or `None` when the slot is solid and empty.
    pub fn paint(&self) -> Option<Paint<'_>> {
        if self.use_gradient {
            return Some(Paint::Gradient(&self.gradient));
        }
        let solid = self.solid.trim();
        if solid.is_empty() {
            None
        } else {
            Some(Paint::Solid(solid))
        }
    }

    /// Returns true when the slot paints anything.
    pub fn is_set(&self) -> bool {
        self.paint().is_some()
    }
}

fn replace_if_changed(slot: &mut String, value: String) -> bool {
    if *slot != value {
        *slot = value;
        true
    } else {
        false
    }
}

// ============================================================================
// Color Utilities
// ============================================================================

/// Parses a CSS color written as a hex code or a named color.
pub fn parse_color(value: &str) -> Option<Srgb<u8>> {
    let value = value.trim();
    if value.starts_with('#') {
        return Srgb::<u8>::from_str(value).ok();
    }
    palette::named::from_str(&value.to_ascii_lowercase())
}

/// Returns true if `value` asks for the service's default icon color.
///
/// Empty strings and any spelling of white (`white`, `#fff`, `#FFFFFF`)
/// count as the default.
pub fn is_default_icon_color(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(DEFAULT_ICON_COLOR) {
        return true;
    }
    parse_color(value) == Some(Srgb::new(255, 255, 255))
}

// ============================================================================
// Tests
// ============================================================================
