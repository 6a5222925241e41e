//! Common utilities for the Linnet inline layout engine.
//!
//! This crate provides shared infrastructure used by the engine and its CLI:
//! - **Diagnostics** - a per-render-pass channel for degraded-rendering and
//!   tree-inconsistency conditions, with colored terminal output

pub mod diagnostics;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
