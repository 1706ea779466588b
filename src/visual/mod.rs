//! Visual transform settings for a generated icon.
//!
//! [`VisualConfig`] is the one place the settings are mutated. Each field
//! group has a named update operation, which keeps the background/scale
//! coupling enforceable:
//!
//! - When a background appears (none → solid or gradient) the scale drops
//!   to 0.7 so the icon fits inside it; when it disappears the scale goes
//!   back to 1.0.
//! - Once the user edits the scale directly, the automatic adjustment is
//!   switched off for the rest of the session.
//!
//! Color slots and the animation can be toggled without losing their
//! stored values.

pub mod animation;
pub mod color;

pub use animation::{Animation, AnimationKind};
pub use color::{ColorSlot, Gradient, GradientDirection, Paint};

use thiserror::Error;

use crate::settings::{Configurable, SettingsSnapshot};

/// Smallest icon size in pixels.
pub const MIN_SIZE: u32 = 16;

/// Largest icon size in pixels.
pub const MAX_SIZE: u32 = 512;

/// Icon size in a fresh session.
pub const DEFAULT_SIZE: u32 = 256;

/// Widest outline in pixels.
pub const MAX_OUTLINE_WIDTH: u32 = 20;

/// Scale with no background.
pub const NEUTRAL_SCALE: f32 = 1.0;

/// Scale applied automatically when a background is added.
pub const BACKGROUND_SCALE: f32 = 0.7;

/// An unrecognized name for one of the settings enums.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ============================================================================
// VisualConfig
// ============================================================================

/// The mutable transform settings of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualConfig {
    icon_color: ColorSlot,
    background: ColorSlot,
    size: u32,
    scale: f32,
    scale_overridden: bool,
    background_active: bool,
    border_radius: u32,
    outline_width: u32,
    outline_color: String,
    animation: Animation,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            icon_color: ColorSlot::new(color::DEFAULT_ICON_COLOR),
            background: ColorSlot::new(""),
            size: DEFAULT_SIZE,
            scale: NEUTRAL_SCALE,
            scale_overridden: false,
            background_active: false,
            border_radius: 0,
            outline_width: 0,
            outline_color: String::new(),
            animation: Animation::default(),
        }
    }
}

impl VisualConfig {
    /// Creates settings with session defaults.
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Read access ----

    /// Icon color slot.
    pub fn icon_color(&self) -> &ColorSlot {
        &self.icon_color
    }

    /// Background slot.
    pub fn background(&self) -> &ColorSlot {
        &self.background
    }

    /// Icon size in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Scale multiplier.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Returns true once the user has set the scale by hand.
    pub fn scale_overridden(&self) -> bool {
        self.scale_overridden
    }

    /// Returns true when a background (solid or gradient) is present.
    pub fn has_background(&self) -> bool {
        self.background_active
    }

    /// Corner radius in pixels.
    pub fn border_radius(&self) -> u32 {
        self.border_radius
    }

    /// Outline width in pixels.
    pub fn outline_width(&self) -> u32 {
        self.outline_width
    }

    /// Stored outline color, regardless of width.
    pub fn outline_color(&self) -> &str {
        &self.outline_color
    }

    /// Outline color that applies, i.e. only when the outline is visible.
    pub fn effective_outline_color(&self) -> Option<&str> {
        let color = self.outline_color.trim();
        (self.outline_width > 0 && !color.is_empty()).then_some(color)
    }

    /// Animation settings.
    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Returns true when the icon color asks for something other than the
    /// service default (a gradient, or a solid color that is not white).
    pub fn recolors_icon(&self) -> bool {
        match self.icon_color.paint() {
            Some(Paint::Gradient(_)) => true,
            Some(Paint::Solid(value)) => !color::is_default_icon_color(value),
            None => false,
        }
    }

    // ---- Icon color ----

    /// Sets the solid icon color.
    pub fn set_icon_color(&mut self, value: impl Into<String>) -> bool {
        self.icon_color.set_solid(value)
    }

    /// Sets the icon gradient stops.
    pub fn set_icon_gradient_stops(&mut self, start: impl Into<String>, end: impl Into<String>) -> bool {
        self.icon_color.set_stops(start, end)
    }

    /// Switches the icon color between solid and gradient.
    pub fn set_icon_gradient(&mut self, enabled: bool) -> bool {
        self.icon_color.set_gradient_enabled(enabled)
    }

    /// Sets the icon gradient direction.
    pub fn set_icon_direction(&mut self, direction: GradientDirection) {
        self.icon_color.set_direction(direction);
    }

    /// Advances the icon gradient direction.
    pub fn cycle_icon_direction(&mut self) -> GradientDirection {
        self.icon_color.cycle_direction()
    }

    // ---- Background ----

    /// Sets the solid background color. An empty value means transparent.
    pub fn set_background_color(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update_background(|bg| bg.set_solid(value))
    }

    /// Sets the background gradient stops.
    pub fn set_background_gradient_stops(
        &mut self,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> bool {
        let (start, end) = (start.into(), end.into());
        self.update_background(|bg| bg.set_stops(start, end))
    }

    /// Switches the background between solid and gradient.
    pub fn set_background_gradient(&mut self, enabled: bool) -> bool {
        self.update_background(|bg| bg.set_gradient_enabled(enabled))
    }

    /// Sets the background gradient direction.
    pub fn set_background_direction(&mut self, direction: GradientDirection) {
        self.update_background(|bg| bg.set_direction(direction));
    }

    /// Advances the background gradient direction.
    pub fn cycle_background_direction(&mut self) -> GradientDirection {
        self.update_background(ColorSlot::cycle_direction)
    }

    /// Runs a background mutation, then reacts to a background appearing
    /// or disappearing.
    fn update_background<R>(&mut self, f: impl FnOnce(&mut ColorSlot) -> R) -> R {
        let result = f(&mut self.background);

        let active = self.background.is_set();
        if active != self.background_active {
            self.background_active = active;
            if !self.scale_overridden {
                self.scale = if active { BACKGROUND_SCALE } else { NEUTRAL_SCALE };
                tracing::debug!(scale = self.scale, "Background toggled; scale auto-adjusted");
            }
        }

        result
    }

    // ---- Geometry ----

    /// Sets the size, clamped to 16-512. The border radius is re-clamped
    /// to the new half-size.
    pub fn set_size(&mut self, size: u32) -> bool {
        let size = size.clamp(MIN_SIZE, MAX_SIZE);
        if size == self.size {
            return false;
        }
        self.size = size;
        self.border_radius = self.border_radius.min(self.max_border_radius());
        true
    }

    /// Sets the scale as a direct user edit.
    ///
    /// This permanently disables automatic scale adjustment. Non-finite or
    /// non-positive values are ignored.
    pub fn set_scale(&mut self, scale: f32) -> bool {
        if !scale.is_finite() || scale <= 0.0 {
            return false;
        }
        self.scale_overridden = true;
        if (self.scale - scale).abs() > f32::EPSILON {
            self.scale = scale;
            true
        } else {
            false
        }
    }

    /// Largest border radius for the current size (a full circle).
    pub fn max_border_radius(&self) -> u32 {
        self.size / 2
    }

    /// Sets the border radius, clamped to 0..=size/2.
    pub fn set_border_radius(&mut self, radius: u32) -> bool {
        let radius = radius.min(self.max_border_radius());
        let changed = radius != self.border_radius;
        self.border_radius = radius;
        changed
    }

    /// Sets the outline width, clamped to 0-20.
    pub fn set_outline_width(&mut self, width: u32) -> bool {
        let width = width.min(MAX_OUTLINE_WIDTH);
        let changed = width != self.outline_width;
        self.outline_width = width;
        changed
    }

    /// Sets the outline color.
    pub fn set_outline_color(&mut self, color: impl Into<String>) {
        self.outline_color = color.into();
    }

    // ---- Animation ----

    /// Turns the animation on or off without losing its kind or duration.
    pub fn set_animation_enabled(&mut self, enabled: bool) -> bool {
        self.animation.set_enabled(enabled)
    }

    /// Sets the animation kind.
    pub fn set_animation_kind(&mut self, kind: AnimationKind) {
        self.animation.set_kind(kind);
    }

    /// Sets the animation duration in seconds.
    pub fn set_animation_duration(&mut self, secs: f32) {
        self.animation.set_duration_secs(secs);
    }
}

impl Configurable for VisualConfig {
    /// Restores every field from a snapshot.
    ///
    /// The stored scale is taken as-is: loading a preset is neither an
    /// automatic adjustment nor a manual edit, so the override flag is left
    /// alone.
    fn apply_settings(&mut self, settings: &SettingsSnapshot) {
        self.icon_color = ColorSlot::new(settings.icon_color.clone());
        self.icon_color
            .set_stops(settings.icon_color1.clone(), settings.icon_color2.clone());
        self.icon_color.set_direction(settings.icon_gradient_direction);
        self.icon_color.set_gradient_enabled(settings.icon_gradient);

        self.background = ColorSlot::new(settings.bg_color.clone());
        self.background
            .set_stops(settings.bg_color1.clone(), settings.bg_color2.clone());
        self.background.set_direction(settings.bg_gradient_direction);
        self.background.set_gradient_enabled(settings.bg_gradient);
        self.background_active = self.background.is_set();

        self.size = settings.size.clamp(MIN_SIZE, MAX_SIZE);
        self.scale = if settings.scale.is_finite() && settings.scale > 0.0 {
            settings.scale
        } else {
            NEUTRAL_SCALE
        };
        self.border_radius = settings.border_radius.min(self.max_border_radius());
        self.outline_width = settings.outline_width.min(MAX_OUTLINE_WIDTH);
        self.outline_color = settings.outline_color.clone();

        self.animation = Animation::new(settings.animation_type, settings.animation_duration);
        self.animation.set_enabled(settings.animation_enabled);
    }

    fn export_settings(&self) -> SettingsSnapshot {
        let icon = self.icon_color.gradient();
        let bg = self.background.gradient();

        SettingsSnapshot {
            icon_color: self.icon_color.solid().to_string(),
            icon_gradient: self.icon_color.is_gradient(),
            icon_color1: icon.start.clone(),
            icon_color2: icon.end.clone(),
            icon_gradient_direction: icon.direction,
            bg_color: self.background.solid().to_string(),
            bg_gradient: self.background.is_gradient(),
            bg_color1: bg.start.clone(),
            bg_color2: bg.end.clone(),
            bg_gradient_direction: bg.direction,
            border_radius: self.border_radius,
            outline_width: self.outline_width,
            outline_color: self.outline_color.clone(),
            animation_enabled: self.animation.is_enabled(),
            animation_type: self.animation.kind(),
            animation_duration: self.animation.duration_secs(),
            size: self.size,
            scale: self.scale,
            last_query: String::new(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
