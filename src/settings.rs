//! Serializable settings snapshots for saved presets.
//!
//! A [`SettingsSnapshot`] captures every visual setting plus the last
//! discovery query, using the camelCase field names the persistence service
//! stores. [`SavedSettings`] adds the preset's identity.
//!
//! # Example
//!
//! ```
//! use icongen_client::{Configurable, SettingsSnapshot, VisualConfig};
//!
//! let mut config = VisualConfig::new();
//! config.set_background_color("navy");
//!
//! let json = config.export_settings().to_json().unwrap();
//!
//! let mut restored = VisualConfig::new();
//! restored.apply_settings(&SettingsSnapshot::from_json(&json).unwrap());
//! assert_eq!(restored.background().solid(), "navy");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::visual::{AnimationKind, GradientDirection, VisualConfig};

// ============================================================================
// Configurable Trait
// ============================================================================

/// A type whose settings can be captured and restored as a snapshot.
pub trait Configurable {
    /// Restores settings from a snapshot.
    fn apply_settings(&mut self, settings: &SettingsSnapshot);

    /// Captures the current settings.
    fn export_settings(&self) -> SettingsSnapshot;
}

// ============================================================================
// SettingsSnapshot
// ============================================================================

/// Every persisted setting, flat, as stored by the persistence service.
///
/// Missing fields deserialize to the session defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct SettingsSnapshot {
    pub icon_color: String,
    pub icon_gradient: bool,
    pub icon_color1: String,
    pub icon_color2: String,
    pub icon_gradient_direction: GradientDirection,

    pub bg_color: String,
    pub bg_gradient: bool,
    pub bg_color1: String,
    pub bg_color2: String,
    pub bg_gradient_direction: GradientDirection,

    pub border_radius: u32,
    pub outline_width: u32,
    pub outline_color: String,

    pub animation_enabled: bool,
    pub animation_type: AnimationKind,
    /// Seconds.
    pub animation_duration: f32,

    /// Pixels.
    pub size: u32,
    pub scale: f32,

    /// Query last sent to the discovery endpoint.
    pub last_query: String,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        VisualConfig::default().export_settings()
    }
}

impl SettingsSnapshot {
    /// Serializes the snapshot to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the snapshot to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Human-readable view grouped the way the settings viewer shows it.
    ///
    /// Fields that do not apply to the active mode (solid color while a
    /// gradient is on, outline color at zero width, animation details while
    /// disabled) are left out.
    pub fn summary(&self) -> Vec<SettingsGroup> {
        let mut icon = SettingsGroup::new("Icon Color");
        icon.push("Gradient Enabled", yes_no(self.icon_gradient));
        if self.icon_gradient {
            icon.push("Color 1", text(&self.icon_color1));
            icon.push("Color 2", text(&self.icon_color2));
            icon.push("Direction", self.icon_gradient_direction.to_string());
        } else {
            icon.push("Solid Color", text(&self.icon_color));
        }

        let mut background = SettingsGroup::new("Background");
        background.push("Gradient Enabled", yes_no(self.bg_gradient));
        if self.bg_gradient {
            background.push("Color 1", text(&self.bg_color1));
            background.push("Color 2", text(&self.bg_color2));
            background.push("Direction", self.bg_gradient_direction.to_string());
        } else {
            background.push("Solid Color", text(&self.bg_color));
        }

        let mut sizing = SettingsGroup::new("Size & Scale");
        sizing.push("Size", format!("{}px", self.size));
        sizing.push("Scale", self.scale.to_string());

        let mut styling = SettingsGroup::new("Styling");
        styling.push("Border Radius", self.border_radius.to_string());
        styling.push("Outline Width", self.outline_width.to_string());
        if self.outline_width > 0 {
            styling.push("Outline Color", text(&self.outline_color));
        }

        let mut animation = SettingsGroup::new("Animation");
        animation.push("Animation Enabled", yes_no(self.animation_enabled));
        if self.animation_enabled {
            animation.push("Type", self.animation_type.to_string());
            animation.push("Duration", format!("{}s", self.animation_duration));
        }

        vec![icon, background, sizing, styling, animation]
    }
}

/// One titled block of the settings summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsGroup {
    pub title: &'static str,
    pub entries: Vec<(&'static str, String)>,
}

impl SettingsGroup {
    fn new(title: &'static str) -> Self {
        Self {
            title,
            entries: Vec::new(),
        }
    }

    fn push(&mut self, label: &'static str, value: String) {
        self.entries.push((label, value));
    }

    /// Value shown for `label`, if the entry is present.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

fn text(value: &str) -> String {
    if value.is_empty() {
        "Empty".to_string()
    } else {
        value.to_string()
    }
}

// ============================================================================
// SavedSettings
// ============================================================================

/// A named preset as stored by the persistence service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct SavedSettings {
    /// Assigned by the service. `None` creates a new preset on save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(flatten)]
    pub settings: SettingsSnapshot,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SavedSettings {
    /// Creates an unsaved preset.
    pub fn new(name: impl Into<String>, settings: SettingsSnapshot) -> Self {
        Self {
            id: None,
            name: name.into(),
            settings,
            updated_at: None,
        }
    }

    /// Targets an existing preset, so saving updates it in place.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
