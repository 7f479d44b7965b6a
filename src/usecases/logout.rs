use std::io;

use crate::{ui::report::LOGOUT_CONFIRMATION_PROMPT, usecases::contracts::AuthTerminal};

pub fn is_confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "yes" | "y")
}

/// Asks before logging out. End of input counts as "no".
pub fn confirm_logout(terminal: &mut dyn AuthTerminal) -> io::Result<bool> {
    let Some(answer) = terminal.prompt_line(LOGOUT_CONFIRMATION_PROMPT)? else {
        return Ok(false);
    };

    Ok(is_confirmed(&answer))
}
