//! Per-pass layout context.
//!
//! Everything a layout pass shares between boxes: the font metrics source,
//! the registry of boxes by element id, and the diagnostics sink. The
//! context is owned by one pass and passed by `&mut`.

use std::collections::HashMap;

use linnet_common::Diagnostics;

use crate::font::FontMetricsProvider;
use crate::tree::BoxId;

/// Maps an element's `id` attribute to the box registered for it.
///
/// Used to resolve fragment links (`target-counter(#id, ...)`) to a box.
#[derive(Debug, Clone, Default)]
pub struct BoxIdRegistry {
    boxes: HashMap<String, BoxId>,
}

impl BoxIdRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` for `box_id`, replacing any earlier registration.
    pub fn register(&mut self, id: impl Into<String>, box_id: BoxId) {
        let _ = self.boxes.insert(id.into(), box_id);
    }

    /// Drop the registration for `id`.
    pub fn remove(&mut self, id: &str) -> Option<BoxId> {
        self.boxes.remove(id)
    }

    /// Drop the registration for `id` only if it points at `box_id`.
    ///
    /// Returns whether anything was removed.
    pub fn remove_if_held(&mut self, id: &str, box_id: BoxId) -> bool {
        if self.boxes.get(id) == Some(&box_id) {
            let _ = self.boxes.remove(id);
            true
        } else {
            false
        }
    }

    /// The box registered for `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<BoxId> {
        self.boxes.get(id).copied()
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// Shared state of one layout pass.
pub struct LayoutContext<'a> {
    font_metrics: &'a dyn FontMetricsProvider,
    /// Boxes registered by element id.
    pub box_ids: BoxIdRegistry,
    /// Degraded-rendering and inconsistency reports.
    pub diagnostics: Diagnostics,
}

impl<'a> LayoutContext<'a> {
    /// A fresh context measuring text with `font_metrics`.
    #[must_use]
    pub fn new(font_metrics: &'a dyn FontMetricsProvider) -> Self {
        Self {
            font_metrics,
            box_ids: BoxIdRegistry::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// The font metrics source.
    #[must_use]
    pub fn font_metrics(&self) -> &'a dyn FontMetricsProvider {
        self.font_metrics
    }
}

impl std::fmt::Debug for LayoutContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutContext")
            .field("box_ids", &self.box_ids)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}
