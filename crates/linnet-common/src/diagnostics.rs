//! Render-pass diagnostics with colored terminal output.
//!
//! A [`Diagnostics`] value lives for exactly one layout or paint pass and is
//! owned by whoever drives that pass. Conditions that do not stop rendering
//! (an inline box asking for a compositing layer, a fragment chain with no
//! closing fragment) are recorded here instead of being printed from deep
//! inside the tree walk. Identical messages are deduplicated within a pass.
//!
//! Every recorded entry is also mirrored to the [`log`] facade so a binary
//! with a logger installed sees it as it happens.

use std::collections::HashSet;
use std::fmt;

use owo_colors::OwoColorize;
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

/// What kind of condition a [`Diagnostic`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Output is produced, but a requested feature was dropped.
    DegradedRendering,
    /// The tree violates a structural expectation; the result is partial.
    Inconsistency,
}

/// A single recorded condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Subsystem that raised the condition, e.g. `"Inline"`.
    pub component: &'static str,
    /// Category of the condition.
    pub kind: DiagnosticKind,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}] {}", self.component, self.kind, self.message)
    }
}

/// Diagnostics collected during one render pass.
///
/// # Example
/// ```
/// use linnet_common::{DiagnosticKind, Diagnostics};
///
/// let mut diagnostics = Diagnostics::new();
/// let first = diagnostics.warn_once("Inline", DiagnosticKind::DegradedRendering, "no layers");
/// let second = diagnostics.warn_once("Inline", DiagnosticKind::DegradedRendering, "no layers");
/// assert!(first && !second);
/// assert_eq!(diagnostics.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    /// Keys of entries already recorded (to deduplicate).
    seen: HashSet<String>,
}

impl Diagnostics {
    /// Create an empty diagnostics channel for a new pass.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a condition (once per unique component/kind/message).
    ///
    /// Returns `true` if the entry was new.
    pub fn warn_once(
        &mut self,
        component: &'static str,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) -> bool {
        let message = message.into();
        let key = format!("[{component}] {kind} {message}");
        if !self.seen.insert(key) {
            return false;
        }

        log::warn!(target: "linnet", "[{component}] {message}");
        self.entries.push(Diagnostic {
            component,
            kind,
            message,
        });
        true
    }

    /// Entries in the order they were recorded.
    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Entries of one kind.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    /// Number of recorded entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take all entries, leaving the channel empty for the next pass.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        self.seen.clear();
        std::mem::take(&mut self.entries)
    }

    /// Render every entry as a colored line, suitable for a terminal.
    #[must_use]
    pub fn render_colored(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let label = format!("[Linnet {}] ⚠", entry.component);
            let line = match entry.kind {
                DiagnosticKind::DegradedRendering => {
                    format!("{} {}\n", label.yellow(), entry.message.yellow())
                }
                DiagnosticKind::Inconsistency => {
                    format!("{} {}\n", label.red(), entry.message.red())
                }
            };
            out.push_str(&line);
        }
        out
    }
}
