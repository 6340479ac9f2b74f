//! Rendering policy types shared between the config file and the font crate.

use serde::{Deserialize, Serialize};

use crate::defaults;

// ============================================================================
// Rendering priorities
// ============================================================================

/// Priority knobs that decide between competing glyph rendering strategies.
///
/// A higher number wins. A value of zero or below disables the strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderPriorities {
    /// Preference for the font's embedded bitmap strikes
    #[serde(default = "defaults::embedded_bitmap_priority")]
    pub embedded_bitmap: i32,
    /// Preference for antialiased (8-bit) rendering
    #[serde(default = "defaults::anti_alias_priority")]
    pub anti_alias: i32,
    /// Preference for hinted outlines
    #[serde(default = "defaults::auto_hint_priority")]
    pub auto_hint: i32,
}

impl Default for RenderPriorities {
    fn default() -> Self {
        Self {
            embedded_bitmap: defaults::embedded_bitmap_priority(),
            anti_alias: defaults::anti_alias_priority(),
            auto_hint: defaults::auto_hint_priority(),
        }
    }
}

// ============================================================================
// Font options
// ============================================================================

/// Whether the autohinter should be forced on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AutoHint {
    /// Let the font instance decide (on when its gamma heuristic is active)
    #[default]
    DontKnow,
    /// Force autohinting
    Yes,
    /// Never force autohinting
    No,
}

/// Hinting strength requested by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HintStyle {
    /// No hinting at all
    None,
    /// Light hinting (vertical only)
    Slight,
    /// Medium hinting
    Medium,
    /// Full hinting (default)
    #[default]
    Full,
}

/// Per-session font rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontOptions {
    /// Autohinter preference
    #[serde(default)]
    pub auto_hint: AutoHint,
    /// Allow antialiased rendering
    #[serde(default = "defaults::enabled")]
    pub anti_alias: bool,
    /// Allow embedded bitmap strikes
    #[serde(default = "defaults::enabled")]
    pub embedded_bitmaps: bool,
    /// Allow hinting
    #[serde(default = "defaults::enabled")]
    pub hinting: bool,
    /// Hinting strength when hinting is allowed
    #[serde(default)]
    pub hint_style: HintStyle,
}

impl Default for FontOptions {
    fn default() -> Self {
        Self {
            auto_hint: AutoHint::default(),
            anti_alias: true,
            embedded_bitmaps: true,
            hinting: true,
            hint_style: HintStyle::default(),
        }
    }
}

impl FontOptions {
    /// Apply the session's "do not use" switches to a set of priorities.
    ///
    /// Each disabled strategy has its priority forced to zero.
    pub fn restrict(&self, priorities: &mut RenderPriorities) {
        if !self.embedded_bitmaps {
            priorities.embedded_bitmap = 0;
        }
        if !self.anti_alias {
            priorities.anti_alias = 0;
        }
        if !self.hinting {
            priorities.auto_hint = 0;
        }
    }
}
