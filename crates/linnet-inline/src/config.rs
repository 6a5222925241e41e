//! Render-pass configuration.
//!
//! Loaded from JSON by the CLI. Every field has a default, so an empty
//! object is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::style::Color;

/// [§ 7.4 Justification Method](https://www.w3.org/TR/css-text-3/#text-justify-property)
///
/// How extra line width is split between word separators and other
/// characters when a line has both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JustificationConfig {
    /// Share given to word separators.
    pub space_share: f32,
    /// Share given to every other character.
    pub non_space_share: f32,
}

impl Default for JustificationConfig {
    fn default() -> Self {
        Self {
            space_share: 0.8,
            non_space_share: 0.2,
        }
    }
}

/// Settings for one layout and paint pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InlineConfig {
    /// Outline every inline box's margin edge while painting.
    pub debug_draw_inline_boxes: bool,
    /// Color of the debug outline.
    pub debug_outline_color: Color,
    /// Justification shares.
    pub justification: JustificationConfig,
}

impl Default for InlineConfig {
    fn default() -> Self {
        Self {
            debug_draw_inline_boxes: false,
            debug_outline_color: Color::BLUE,
            justification: JustificationConfig::default(),
        }
    }
}
