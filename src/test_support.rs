use std::{cell::RefCell, collections::VecDeque, io, rc::Rc};

use crate::{
    domain::{auth_state::AuthorizationState, input::InputRequest, user::UserProfile},
    infra::{config::AppConfig, storage_layout::StorageLayout},
    usecases::contracts::{
        AuthTerminal, EngineError, InputResolution, InputResolver, SessionEngine, Tone,
    },
};

/// Config with credentials and a state dir inside a fresh temp dir.
/// The state dir itself is not created.
pub fn configured_app() -> (AppConfig, StorageLayout, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir should be creatable");
    let mut config = AppConfig::default();
    config.telegram.api_id = Some("12345".to_owned());
    config.telegram.api_hash = Some("0123456789abcdef".to_owned());
    config.storage.state_dir = Some(dir.path().join("state"));

    let layout = StorageLayout::resolve(&config.storage).expect("layout should resolve");
    (config, layout, dir)
}

#[derive(Debug, Default)]
pub struct TerminalLog {
    pub printed: Vec<(Tone, String)>,
    pub errors: Vec<String>,
    pub prompts: Vec<String>,
}

impl TerminalLog {
    pub fn printed_text(&self) -> String {
        self.printed
            .iter()
            .map(|(_, line)| line.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Scripted terminal; clones share the same script and log.
#[derive(Debug, Clone)]
pub struct FakeTerminal {
    inputs: Rc<RefCell<VecDeque<Option<String>>>>,
    log: Rc<RefCell<TerminalLog>>,
}

impl FakeTerminal {
    pub fn new(inputs: Vec<Option<&str>>) -> Self {
        Self {
            inputs: Rc::new(RefCell::new(
                inputs
                    .into_iter()
                    .map(|item| item.map(|value| value.to_owned()))
                    .collect(),
            )),
            log: Rc::new(RefCell::new(TerminalLog::default())),
        }
    }

    pub fn log(&self) -> Rc<RefCell<TerminalLog>> {
        Rc::clone(&self.log)
    }

    fn next_input(&mut self, prompt: &str) -> Option<String> {
        self.log.borrow_mut().prompts.push(prompt.to_owned());
        self.inputs.borrow_mut().pop_front().flatten()
    }
}

impl AuthTerminal for FakeTerminal {
    fn print_line(&mut self, line: &str) -> io::Result<()> {
        self.print_toned(Tone::Plain, line)
    }

    fn print_error(&mut self, line: &str) -> io::Result<()> {
        self.log.borrow_mut().errors.push(line.to_owned());
        Ok(())
    }

    fn print_toned(&mut self, tone: Tone, line: &str) -> io::Result<()> {
        self.log.borrow_mut().printed.push((tone, line.to_owned()));
        Ok(())
    }

    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        Ok(self.next_input(prompt))
    }

    fn prompt_secret(&mut self, prompt: &str) -> io::Result<Option<String>> {
        Ok(self.next_input(prompt))
    }
}

#[derive(Debug, Default)]
pub struct EngineCalls {
    pub logins: usize,
    pub log_outs: usize,
    pub state_queries: usize,
    pub user_queries: usize,
    pub closes: usize,
}

/// Scripted engine that records every call made through [`SessionEngine`].
#[derive(Debug)]
pub struct FakeEngine {
    state: AuthorizationState,
    user: Option<UserProfile>,
    login_requests: Vec<InputRequest>,
    calls: Rc<RefCell<EngineCalls>>,
    answers: Rc<RefCell<Vec<String>>>,
    login_error: Option<String>,
    logout_error: Option<String>,
    status_error: Option<String>,
    close_error: Option<String>,
}

impl FakeEngine {
    pub fn new(state: AuthorizationState) -> Self {
        Self {
            state,
            user: None,
            login_requests: Vec::new(),
            calls: Rc::new(RefCell::new(EngineCalls::default())),
            answers: Rc::new(RefCell::new(Vec::new())),
            login_error: None,
            logout_error: None,
            status_error: None,
            close_error: None,
        }
    }

    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_login_requests(mut self, requests: Vec<InputRequest>) -> Self {
        self.login_requests = requests;
        self
    }

    pub fn failing_login(mut self, message: &str) -> Self {
        self.login_error = Some(message.to_owned());
        self
    }

    pub fn failing_logout(mut self, message: &str) -> Self {
        self.logout_error = Some(message.to_owned());
        self
    }

    pub fn failing_status(mut self, message: &str) -> Self {
        self.status_error = Some(message.to_owned());
        self
    }

    pub fn failing_close(mut self, message: &str) -> Self {
        self.close_error = Some(message.to_owned());
        self
    }

    pub fn calls(&self) -> Rc<RefCell<EngineCalls>> {
        Rc::clone(&self.calls)
    }

    pub fn answers(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.answers)
    }
}

fn remote(message: &Option<String>) -> Result<(), EngineError> {
    match message {
        Some(message) => Err(EngineError::Remote {
            code: 400,
            message: message.clone(),
        }),
        None => Ok(()),
    }
}

impl SessionEngine for FakeEngine {
    fn wait_ready(&mut self, resolver: &mut dyn InputResolver) -> Result<(), EngineError> {
        self.calls.borrow_mut().logins += 1;

        for request in &self.login_requests {
            let answer = match resolver
                .resolve_input(request)
                .map_err(EngineError::Input)?
            {
                InputResolution::Answer(answer) => answer,
                InputResolution::Unhandled => resolver
                    .read_line(&format!("Enter {}: ", request.kind.as_str()))
                    .map_err(EngineError::Input)?,
            };
            self.answers.borrow_mut().push(answer);
        }

        remote(&self.login_error)?;
        self.state = AuthorizationState::Ready;
        Ok(())
    }

    fn log_out(&mut self) -> Result<(), EngineError> {
        self.calls.borrow_mut().log_outs += 1;
        remote(&self.logout_error)?;
        self.state = AuthorizationState::LoggedOut;
        Ok(())
    }

    fn authorization_state(&mut self) -> Result<AuthorizationState, EngineError> {
        self.calls.borrow_mut().state_queries += 1;
        remote(&self.status_error)?;
        Ok(self.state)
    }

    fn current_user(&mut self) -> Result<UserProfile, EngineError> {
        self.calls.borrow_mut().user_queries += 1;
        self.user.clone().ok_or_else(|| EngineError::Remote {
            code: 404,
            message: "user not found".to_owned(),
        })
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.calls.borrow_mut().closes += 1;
        remote(&self.close_error)
    }
}
