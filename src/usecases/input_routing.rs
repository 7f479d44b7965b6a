//! Routes engine input requests to terminal prompts.
//!
//! Every known request kind maps to exactly one prompt and one terminal read.
//! The terminal itself is opened lazily on the first read and reused until
//! [`PromptRouter::release_terminal`] is called.

use std::io;

use crate::{
    domain::input::{InputRequest, InputRequestKind},
    ui::terminal::StdTerminal,
    usecases::contracts::{AuthTerminal, InputResolution, InputResolver},
};

const AUTHORIZATION_TYPE_USER: &str = "user";

/// How a single request is answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Immediate(&'static str),
    Line(String),
    Secret(String),
    Delegate,
}

pub fn route(request: &InputRequest) -> Route {
    let hint_suffix = || {
        request
            .extras
            .hint
            .as_deref()
            .map(|hint| format!(" (hint: {hint})"))
            .unwrap_or_default()
    };

    match request.kind {
        InputRequestKind::AuthorizationType => Route::Immediate(AUTHORIZATION_TYPE_USER),
        InputRequestKind::AuthorizationValue => Route::Line(
            "Enter your phone number (with country code, e.g., +1234567890): ".to_owned(),
        ),
        InputRequestKind::FirstName => {
            Route::Line("Enter your first name (for new account): ".to_owned())
        }
        InputRequestKind::AuthorizationCode => {
            Route::Line("Enter the verification code you received: ".to_owned())
        }
        InputRequestKind::AuthorizationCodeIncorrect => Route::Line(
            "Incorrect code. Please enter the verification code again: ".to_owned(),
        ),
        InputRequestKind::AuthorizationPassword => {
            Route::Secret(format!("Enter your 2FA password{}: ", hint_suffix()))
        }
        InputRequestKind::AuthorizationPasswordIncorrect => Route::Secret(format!(
            "Incorrect password. Please enter your 2FA password again{}: ",
            hint_suffix()
        )),
        InputRequestKind::Other(_) => Route::Delegate,
    }
}

type TerminalOpener = Box<dyn FnMut() -> Box<dyn AuthTerminal>>;

pub struct PromptRouter {
    open_terminal: TerminalOpener,
    terminal: Option<Box<dyn AuthTerminal>>,
}

impl std::fmt::Debug for PromptRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptRouter")
            .field("terminal_open", &self.terminal.is_some())
            .finish()
    }
}

impl PromptRouter {
    pub fn new<F>(open_terminal: F) -> Self
    where
        F: FnMut() -> Box<dyn AuthTerminal> + 'static,
    {
        Self {
            open_terminal: Box::new(open_terminal),
            terminal: None,
        }
    }

    pub fn stdio() -> Self {
        Self::new(|| Box::new(StdTerminal))
    }

    pub fn has_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    /// Drops the terminal if one is open. Safe to call repeatedly.
    pub fn release_terminal(&mut self) -> bool {
        self.terminal.take().is_some()
    }

    pub fn handle_input(&mut self, request: &InputRequest) -> io::Result<InputResolution> {
        tracing::debug!(kind = request.kind.as_str(), "engine requested input");

        let answer = match route(request) {
            Route::Immediate(value) => value.to_owned(),
            Route::Line(prompt) => self.read_line(&prompt)?,
            Route::Secret(prompt) => {
                let answer = self.terminal().prompt_secret(&prompt)?;
                require_answer(answer)?
            }
            Route::Delegate => return Ok(InputResolution::Unhandled),
        };

        Ok(InputResolution::Answer(answer))
    }

    fn terminal(&mut self) -> &mut dyn AuthTerminal {
        let open_terminal = &mut self.open_terminal;
        &mut **self.terminal.get_or_insert_with(|| open_terminal())
    }
}

impl InputResolver for PromptRouter {
    fn resolve_input(&mut self, request: &InputRequest) -> io::Result<InputResolution> {
        self.handle_input(request)
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        let answer = self.terminal().prompt_line(prompt)?;
        require_answer(answer)
    }
}

fn require_answer(answer: Option<String>) -> io::Result<String> {
    answer
        .map(|value| value.trim().to_owned())
        .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "input cancelled (EOF)"))
}
