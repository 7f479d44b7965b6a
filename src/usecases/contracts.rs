use std::{io, path::PathBuf};

use thiserror::Error;

use crate::domain::{auth_state::AuthorizationState, input::InputRequest, user::UserProfile};

#[derive(Debug, Error)]
pub enum EngineError {
    /// Failure reported by the engine itself; the message is passed through verbatim.
    #[error("{message}")]
    Remote { code: i32, message: String },
    #[error("terminal input failed: {0}")]
    Input(#[source] io::Error),
    #[error("unsupported login step: {0}")]
    Unsupported(String),
    #[error("session engine unavailable: {0}")]
    Unavailable(String),
    #[error("session engine is closed")]
    Closed,
}

/// Everything the engine needs to open its local session store.
#[derive(Clone, PartialEq, Eq)]
pub struct EngineParameters {
    pub api_id: i32,
    pub api_hash: String,
    pub database_dir: PathBuf,
    pub files_dir: PathBuf,
    pub database_encryption_key: String,
    pub use_test_dc: bool,
    pub use_file_database: bool,
    pub use_chat_info_database: bool,
    pub use_message_database: bool,
    pub use_secret_chats: bool,
    pub system_language_code: String,
    pub device_model: String,
    pub application_version: String,
    pub log_verbosity: i32,
    pub shutdown_timeout_ms: u64,
}

impl std::fmt::Debug for EngineParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineParameters")
            .field("api_id", &self.api_id)
            .field("database_dir", &self.database_dir)
            .field("files_dir", &self.files_dir)
            .field("use_test_dc", &self.use_test_dc)
            .field("use_secret_chats", &self.use_secret_chats)
            .field("use_chat_info_database", &self.use_chat_info_database)
            .field("use_message_database", &self.use_message_database)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResolution {
    Answer(String),
    /// No dedicated prompt; the engine falls back to its own default handler.
    Unhandled,
}

/// Answers engine input requests. The engine calls it from its own login loop,
/// one request at a time.
pub trait InputResolver {
    fn resolve_input(&mut self, request: &InputRequest) -> io::Result<InputResolution>;
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;
}

pub trait SessionEngine {
    /// Blocks until the account is authorized, asking `resolver` for every
    /// piece of input the engine needs on the way.
    fn wait_ready(&mut self, resolver: &mut dyn InputResolver) -> Result<(), EngineError>;
    fn log_out(&mut self) -> Result<(), EngineError>;
    fn authorization_state(&mut self) -> Result<AuthorizationState, EngineError>;
    fn current_user(&mut self) -> Result<UserProfile, EngineError>;
    fn close(&mut self) -> Result<(), EngineError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Banner,
    Success,
    Warning,
    Failure,
    Plain,
}

pub trait AuthTerminal {
    fn print_line(&mut self, line: &str) -> io::Result<()>;
    fn print_error(&mut self, line: &str) -> io::Result<()>;
    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
    fn prompt_secret(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn print_toned(&mut self, _tone: Tone, line: &str) -> io::Result<()> {
        self.print_line(line)
    }
}
