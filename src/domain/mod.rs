//! Domain layer: core entities and business rules.

pub mod auth_state;
pub mod input;
pub mod status;
pub mod user;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
