//! Text runs and dynamic text content.
//!
//! [§ 2.5 Text Runs](https://www.w3.org/TR/css-display-3/#text-nodes)
//!
//! A text run is a span of shaped text from one source text node, placed
//! inside an inline box. Its characters never change after shaping; layout
//! only moves it and widens it during justification. The one exception is a
//! run generated by a content function (a counter or a leader), whose value
//! is re-evaluated on each render pass.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::font::FontMetricsProvider;
use crate::justify::{CharCounts, JustificationInfo, is_justifiable_space};
use crate::style::InlineStyle;

/// [CSS Generated Content for Paged Media](https://www.w3.org/TR/css-gcpm-3/)
///
/// Content functions whose value depends on the finished layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentFunction {
    /// `counter(name)`
    Counter {
        /// Counter name.
        name: String,
    },
    /// `target-counter(url, name)`
    TargetCounter {
        /// Fragment identifier of the target element.
        target: String,
        /// Counter name.
        name: String,
    },
    /// `leader(fill)`
    Leader {
        /// Fill string repeated to occupy the available space.
        fill: String,
    },
}

impl ContentFunction {
    /// Whether this is a `leader()` function.
    #[must_use]
    pub const fn is_leader(&self) -> bool {
        matches!(self, Self::Leader { .. })
    }
}

/// Evaluates content functions against the current render pass.
pub trait DynamicContentResolver {
    /// The current value of `function`, or `None` if it cannot be resolved
    /// yet (the run keeps its previous text).
    fn evaluate(&self, function: &ContentFunction) -> Option<String>;
}

/// A run of shaped text inside an inline box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    text: String,
    /// Horizontal offset from the owning inline box's absolute origin.
    pub x: f32,
    /// Advance width, including any justification growth.
    pub width: f32,
    #[serde(default)]
    dynamic: Option<ContentFunction>,
}

impl TextRun {
    /// A run of already-measured text.
    #[must_use]
    pub fn new(text: impl Into<String>, width: f32) -> Self {
        Self {
            text: text.into(),
            x: 0.0,
            width,
            dynamic: None,
        }
    }

    /// A run whose text comes from a content function. `placeholder` is
    /// shown until the first evaluation.
    #[must_use]
    pub fn dynamic(function: ContentFunction, placeholder: impl Into<String>, width: f32) -> Self {
        Self {
            dynamic: Some(function),
            ..Self::new(placeholder, width)
        }
    }

    /// The run's characters.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the run has no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether the run is generated by a content function.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        self.dynamic.is_some()
    }

    /// The content function generating this run, if any.
    #[must_use]
    pub const fn dynamic_function(&self) -> Option<&ContentFunction> {
        self.dynamic.as_ref()
    }

    /// Text used when exporting the document as plain text.
    #[must_use]
    pub fn export_text(&self) -> &str {
        &self.text
    }

    /// Add this run's spaces and non-spaces to `counts`.
    pub fn count_justifiable_chars(&self, counts: &mut CharCounts) {
        for ch in self.text.chars() {
            if is_justifiable_space(ch) {
                counts.space_count += 1;
            } else {
                counts.non_space_count += 1;
            }
        }
    }

    /// Extra width this run takes under `info`.
    #[must_use]
    pub fn total_adjustment(&self, info: &JustificationInfo) -> f32 {
        self.text
            .chars()
            .map(|ch| {
                if is_justifiable_space(ch) {
                    info.space_adjust
                } else {
                    info.non_space_adjust
                }
            })
            .sum()
    }

    /// Re-evaluate the content function and re-measure the run.
    ///
    /// Returns `true` if the text changed. Static runs are left alone.
    pub fn update_dynamic_value(
        &mut self,
        resolver: &dyn DynamicContentResolver,
        style: &InlineStyle,
        metrics: &dyn FontMetricsProvider,
    ) -> bool {
        let Some(function) = &self.dynamic else {
            return false;
        };
        let Some(value) = resolver.evaluate(function) else {
            return false;
        };
        if value == self.text {
            return false;
        }
        self.width = metrics.text_width(&value, style);
        self.text = value;
        true
    }
}

impl fmt::Display for TextRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextRun: {:?} (x={}, width={})", self.text, self.x, self.width)
    }
}
