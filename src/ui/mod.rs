//! UI layer: terminal I/O and command output rendering.

pub mod report;
pub mod terminal;

/// Returns the UI module name for smoke checks.
pub fn module_name() -> &'static str {
    "ui"
}
