//! Telegram integration layer: the TDLib-backed session engine.

mod engine;
mod updates;

pub use engine::TdlibEngine;

/// Returns the telegram module name for smoke checks.
pub fn module_name() -> &'static str {
    "telegram"
}
