use crate::{domain::status::SessionStatus, usecases::contracts::Tone};

pub const LOGIN_BANNER: &str = "🔐 TeleRTX - Telegram Login";
pub const LOGOUT_BANNER: &str = "🚪 TeleRTX - Telegram Logout";
pub const STATUS_BANNER: &str = "📊 TeleRTX - Status Check";

pub const LOGOUT_CONFIRMATION_PROMPT: &str = "Are you sure you want to logout? (yes/no): ";

pub fn status_lines(status: &SessionStatus) -> Vec<(Tone, String)> {
    if !status.is_logged_in {
        return vec![
            (Tone::Warning, "⚠ Status: Not logged in".to_owned()),
            (
                Tone::Plain,
                format!("   State: {}", status.auth_state.as_label()),
            ),
            (
                Tone::Plain,
                "   Run \"telertx login\" to login".to_owned(),
            ),
        ];
    }

    let mut lines = vec![(Tone::Success, "✓ Status: Logged in".to_owned())];
    if let Some(user) = &status.user {
        lines.push((Tone::Plain, format!("   User: {}", user.display_name())));
        lines.push((Tone::Plain, format!("   Phone: {}", user.phone_number)));
        lines.push((
            Tone::Plain,
            format!("   Username: @{}", user.username_or_fallback()),
        ));
    }
    lines
}

pub fn failure_line(operation: &str, error: &dyn std::fmt::Display) -> String {
    format!("✗ {operation} failed: {error}")
}
