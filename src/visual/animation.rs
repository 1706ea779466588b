//! Animation settings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ParseEnumError;

/// Shortest accepted animation duration, in seconds.
pub const MIN_DURATION_SECS: f32 = 0.1;

/// Longest accepted animation duration, in seconds.
pub const MAX_DURATION_SECS: f32 = 10.0;

/// Kind of animation applied by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum AnimationKind {
    #[default]
    Spin,
    Pulse,
    FlipH,
    FlipV,
}

impl AnimationKind {
    pub const ALL: [Self; 4] = [Self::Spin, Self::Pulse, Self::FlipH, Self::FlipV];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spin => "spin",
            Self::Pulse => "pulse",
            Self::FlipH => "flip-h",
            Self::FlipV => "flip-v",
        }
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimationKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError::new("animation type", s))
    }
}

/// Animation configuration with an on/off switch.
///
/// Turning the animation off keeps the kind and duration, so turning it
/// back on restores the previous choice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    enabled: bool,
    kind: AnimationKind,
    duration_secs: f32,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: AnimationKind::default(),
            duration_secs: 1.0,
        }
    }
}

impl Animation {
    /// Creates an enabled animation. The duration is clamped to 0.1-10 seconds.
    pub fn new(kind: AnimationKind, duration_secs: f32) -> Self {
        Self {
            enabled: true,
            kind,
            duration_secs: clamp_duration(duration_secs),
        }
    }

    /// Returns whether the animation is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the stored kind.
    pub fn kind(&self) -> AnimationKind {
        self.kind
    }

    /// Returns the stored duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.duration_secs
    }

    /// Sets whether the animation is enabled. Returns true if it changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        if self.enabled != enabled {
            self.enabled = enabled;
            true
        } else {
            false
        }
    }

    /// Sets the kind.
    pub fn set_kind(&mut self, kind: AnimationKind) {
        self.kind = kind;
    }

    /// Sets the duration, clamped to 0.1-10 seconds.
    ///
    /// Non-finite values are ignored.
    pub fn set_duration_secs(&mut self, secs: f32) {
        if secs.is_finite() {
            self.duration_secs = clamp_duration(secs);
        }
    }

    /// Wire encoding `"<type>:<seconds>s"`, or `None` when disabled.
    pub fn encode(&self) -> Option<String> {
        self.enabled
            .then(|| format!("{}:{}s", self.kind.as_str(), self.duration_secs))
    }
}

fn clamp_duration(secs: f32) -> f32 {
    secs.clamp(MIN_DURATION_SECS, MAX_DURATION_SECS)
}
