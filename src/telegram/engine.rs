use std::{
    future::Future,
    path::Path,
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    time::{Duration, Instant},
};

use tdlib_rs::{enums, functions, types};
use tokio::runtime::{Builder, Runtime};

use crate::{
    domain::{
        auth_state::AuthorizationState,
        input::{InputRequest, InputRequestKind},
        user::UserProfile,
    },
    infra::secrets::redact_text,
    telegram::updates::UpdatePump,
    usecases::contracts::{
        EngineError, EngineParameters, InputResolution, InputResolver, SessionEngine,
    },
};

const EMAIL_ADDRESS_REQUEST: &str = "email-address";
const EMAIL_CODE_REQUEST: &str = "email-code";

/// Session engine backed by TDLib.
///
/// Requests run on a current-thread runtime; their responses and all updates
/// arrive through the [`UpdatePump`] worker.
pub struct TdlibEngine {
    rt: Runtime,
    client_id: i32,
    parameters: EngineParameters,
    states: Receiver<enums::AuthorizationState>,
    state: enums::AuthorizationState,
    updates: Option<UpdatePump>,
    closed: bool,
}

impl std::fmt::Debug for TdlibEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TdlibEngine")
            .field("client_id", &self.client_id)
            .field("state", &map_authorization_state(&self.state))
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl TdlibEngine {
    /// Creates the client, hands it its parameters and waits until the local
    /// session store has been opened.
    pub fn start(parameters: &EngineParameters) -> Result<Self, EngineError> {
        let rt = Builder::new_current_thread().build().map_err(|error| {
            EngineError::Unavailable(format!("failed to initialize async runtime: {error}"))
        })?;

        let client_id = tdlib_rs::create_client();
        let (state_tx, states) = mpsc::channel();
        let updates = UpdatePump::start(client_id, state_tx).map_err(|error| {
            EngineError::Unavailable(format!("failed to start update worker: {error}"))
        })?;

        let mut engine = Self {
            rt,
            client_id,
            parameters: parameters.clone(),
            states,
            state: enums::AuthorizationState::WaitTdlibParameters,
            updates: Some(updates),
            closed: false,
        };

        engine.call(functions::set_log_verbosity_level(
            parameters.log_verbosity,
            client_id,
        ))?;
        engine.settle()?;

        tracing::debug!(
            client_id,
            state = map_authorization_state(&engine.state).as_label(),
            "session engine started"
        );
        Ok(engine)
    }

    fn call<T, F>(&self, request: F) -> Result<T, EngineError>
    where
        F: Future<Output = Result<T, types::Error>>,
    {
        self.rt.block_on(request).map_err(report_error)
    }

    fn settle(&mut self) -> Result<(), EngineError> {
        loop {
            self.advance()?;
            match self.state {
                enums::AuthorizationState::WaitTdlibParameters => self.send_parameters()?,
                _ => return Ok(()),
            }
        }
    }

    /// Blocks for the next state change and skips over any that are already stale.
    fn advance(&mut self) -> Result<(), EngineError> {
        let mut next = self.states.recv().map_err(|_| {
            EngineError::Unavailable("engine update stream ended".to_owned())
        })?;
        while let Ok(newer) = self.states.try_recv() {
            next = newer;
        }

        tracing::debug!(
            state = map_authorization_state(&next).as_label(),
            "authorization state changed"
        );
        self.state = next;
        Ok(())
    }

    fn send_parameters(&self) -> Result<(), EngineError> {
        let p = &self.parameters;
        self.call(functions::set_tdlib_parameters(
            p.use_test_dc,
            path_string(&p.database_dir),
            path_string(&p.files_dir),
            p.database_encryption_key.clone(),
            p.use_file_database,
            p.use_chat_info_database,
            p.use_message_database,
            p.use_secret_chats,
            p.api_id,
            p.api_hash.clone(),
            p.system_language_code.clone(),
            p.device_model.clone(),
            String::new(),
            p.application_version.clone(),
            self.client_id,
        ))
    }

    fn ensure_open(&self) -> Result<(), EngineError> {
        if self.closed {
            return Err(EngineError::Closed);
        }
        Ok(())
    }

    fn wait_for_closed(&mut self) {
        if matches!(self.state, enums::AuthorizationState::Closed) {
            return;
        }

        let deadline =
            Instant::now() + Duration::from_millis(self.parameters.shutdown_timeout_ms);
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.states.recv_timeout(remaining) {
                Ok(enums::AuthorizationState::Closed) => {
                    self.state = enums::AuthorizationState::Closed;
                    return;
                }
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) => {
                    tracing::debug!(
                        timeout_ms = self.parameters.shutdown_timeout_ms,
                        "engine did not report closed state in time"
                    );
                    return;
                }
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }

    fn shutdown(&mut self) -> Result<(), EngineError> {
        let result = if self.closed {
            Ok(())
        } else {
            self.closed = true;
            let result = self.call(functions::close(self.client_id));
            if result.is_ok() {
                self.wait_for_closed();
            }
            result
        };

        self.updates.take();
        result
    }
}

impl SessionEngine for TdlibEngine {
    fn wait_ready(&mut self, resolver: &mut dyn InputResolver) -> Result<(), EngineError> {
        self.ensure_open()?;

        let mut authorization_type_checked = false;
        let mut code_rejected = false;
        let mut password_rejected = false;

        loop {
            match self.state.clone() {
                enums::AuthorizationState::Ready => return Ok(()),
                enums::AuthorizationState::WaitTdlibParameters => self.send_parameters()?,
                enums::AuthorizationState::WaitPhoneNumber => {
                    if !authorization_type_checked {
                        let kind = ask(
                            resolver,
                            InputRequest::new(InputRequestKind::AuthorizationType),
                        )?;
                        if kind != "user" {
                            return Err(EngineError::Unsupported(format!(
                                "authorization type `{kind}`"
                            )));
                        }
                        authorization_type_checked = true;
                    }

                    let phone = ask(
                        resolver,
                        InputRequest::new(InputRequestKind::AuthorizationValue),
                    )?;
                    self.call(functions::set_authentication_phone_number(
                        phone,
                        None,
                        self.client_id,
                    ))?;
                }
                enums::AuthorizationState::WaitCode(_) => {
                    let kind = if code_rejected {
                        InputRequestKind::AuthorizationCodeIncorrect
                    } else {
                        InputRequestKind::AuthorizationCode
                    };
                    let code = ask(resolver, InputRequest::new(kind))?;

                    match self
                        .rt
                        .block_on(functions::check_authentication_code(code, self.client_id))
                    {
                        Ok(()) => code_rejected = false,
                        Err(error) if is_invalid_code_error(&error.message) => {
                            tracing::warn!(code = error.code, message = %error.message, "verification code rejected");
                            code_rejected = true;
                            continue;
                        }
                        Err(error) => return Err(report_error(error)),
                    }
                }
                enums::AuthorizationState::WaitPassword(wait) => {
                    let kind = if password_rejected {
                        InputRequestKind::AuthorizationPasswordIncorrect
                    } else {
                        InputRequestKind::AuthorizationPassword
                    };
                    let password = ask(
                        resolver,
                        InputRequest::new(kind).with_hint(wait.password_hint),
                    )?;

                    match self.rt.block_on(functions::check_authentication_password(
                        password,
                        self.client_id,
                    )) {
                        Ok(()) => password_rejected = false,
                        Err(error) if is_wrong_password_error(&error.message) => {
                            tracing::warn!(code = error.code, "2FA password rejected");
                            password_rejected = true;
                            continue;
                        }
                        Err(error) => return Err(report_error(error)),
                    }
                }
                enums::AuthorizationState::WaitRegistration(_) => {
                    let first_name =
                        ask(resolver, InputRequest::new(InputRequestKind::FirstName))?;
                    self.call(functions::register_user(
                        first_name,
                        String::new(),
                        false,
                        self.client_id,
                    ))?;
                }
                enums::AuthorizationState::WaitEmailAddress(_) => {
                    let email = ask(
                        resolver,
                        InputRequest::new(InputRequestKind::parse(EMAIL_ADDRESS_REQUEST)),
                    )?;
                    self.call(functions::set_authentication_email_address(
                        email,
                        self.client_id,
                    ))?;
                }
                enums::AuthorizationState::WaitEmailCode(_) => {
                    let code = ask(
                        resolver,
                        InputRequest::new(InputRequestKind::parse(EMAIL_CODE_REQUEST)),
                    )?;
                    self.call(functions::check_authentication_email_code(
                        enums::EmailAddressAuthentication::Code(
                            types::EmailAddressAuthenticationCode { code },
                        ),
                        self.client_id,
                    ))?;
                }
                enums::AuthorizationState::WaitOtherDeviceConfirmation(confirmation) => {
                    return Err(EngineError::Unsupported(format!(
                        "confirm this login on another device: {}",
                        confirmation.link
                    )));
                }
                enums::AuthorizationState::LoggingOut
                | enums::AuthorizationState::Closing
                | enums::AuthorizationState::Closed => return Err(EngineError::Closed),
                #[allow(unreachable_patterns)]
                other => {
                    return Err(EngineError::Unsupported(format!(
                        "authorization state {}",
                        map_authorization_state(&other)
                    )));
                }
            }

            self.advance()?;
        }
    }

    fn log_out(&mut self) -> Result<(), EngineError> {
        self.ensure_open()?;
        self.call(functions::log_out(self.client_id))?;

        while !matches!(self.state, enums::AuthorizationState::Closed) {
            self.advance()?;
        }
        self.closed = true;
        Ok(())
    }

    fn authorization_state(&mut self) -> Result<AuthorizationState, EngineError> {
        self.ensure_open()?;
        let state = self.call(functions::get_authorization_state(self.client_id))?;
        Ok(map_authorization_state(&state))
    }

    fn current_user(&mut self) -> Result<UserProfile, EngineError> {
        self.ensure_open()?;
        let enums::User::User(user) = self.call(functions::get_me(self.client_id))?;
        Ok(profile_from(user))
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.shutdown()
    }
}

impl Drop for TdlibEngine {
    fn drop(&mut self) {
        if let Err(error) = self.shutdown() {
            tracing::debug!(%error, "session engine teardown on drop failed");
        }
    }
}

/// Resolves one request, falling back to the engine's generic prompt.
fn ask(resolver: &mut dyn InputResolver, request: InputRequest) -> Result<String, EngineError> {
    match resolver
        .resolve_input(&request)
        .map_err(EngineError::Input)?
    {
        InputResolution::Answer(answer) => Ok(answer),
        InputResolution::Unhandled => resolver
            .read_line(&default_prompt(&request))
            .map_err(EngineError::Input),
    }
}

fn default_prompt(request: &InputRequest) -> String {
    format!("Enter {}: ", request.kind.as_str().replace('-', " "))
}

fn report_error(error: types::Error) -> EngineError {
    if let Some(seconds) = retry_after_seconds(&error) {
        tracing::warn!(seconds, "engine is rate limiting requests");
    }

    tracing::error!(
        code = error.code,
        message = %redact_text(&error.message),
        "session engine reported an error"
    );

    EngineError::Remote {
        code: error.code,
        message: error.message,
    }
}

fn map_authorization_state(state: &enums::AuthorizationState) -> AuthorizationState {
    match state {
        enums::AuthorizationState::WaitPhoneNumber => AuthorizationState::AwaitingPhone,
        enums::AuthorizationState::WaitCode(_) => AuthorizationState::AwaitingCode,
        enums::AuthorizationState::WaitPassword(_) => AuthorizationState::AwaitingPassword,
        enums::AuthorizationState::WaitRegistration(_) => {
            AuthorizationState::AwaitingRegistration
        }
        enums::AuthorizationState::WaitEmailAddress(_)
        | enums::AuthorizationState::WaitEmailCode(_) => AuthorizationState::AwaitingEmail,
        enums::AuthorizationState::WaitOtherDeviceConfirmation(_) => {
            AuthorizationState::AwaitingDeviceConfirmation
        }
        enums::AuthorizationState::Ready => AuthorizationState::Ready,
        enums::AuthorizationState::LoggingOut => AuthorizationState::LoggingOut,
        enums::AuthorizationState::Closing | enums::AuthorizationState::Closed => {
            AuthorizationState::LoggedOut
        }
        _ => AuthorizationState::Unauthenticated,
    }
}

fn profile_from(user: types::User) -> UserProfile {
    UserProfile {
        first_name: user.first_name,
        last_name: Some(user.last_name).filter(|name| !name.is_empty()),
        phone_number: format_phone(&user.phone_number),
        username: user
            .usernames
            .and_then(|usernames| usernames.active_usernames.into_iter().next()),
    }
}

fn format_phone(raw: &str) -> String {
    if raw.is_empty() || raw.starts_with('+') {
        raw.to_owned()
    } else {
        format!("+{raw}")
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn is_invalid_code_error(message: &str) -> bool {
    let message = message.to_ascii_uppercase();
    message.contains("PHONE_CODE_INVALID") || message.contains("PHONE_CODE_EMPTY")
}

fn is_wrong_password_error(message: &str) -> bool {
    let message = message.to_ascii_uppercase();
    message.contains("PASSWORD_HASH_INVALID") || message.contains("PASSWORD_EMPTY")
}

fn retry_after_seconds(error: &types::Error) -> Option<u32> {
    let lowered = error.message.to_ascii_lowercase();
    if error.code != 429 && !lowered.contains("flood") && !lowered.contains("retry after") {
        return None;
    }

    lowered
        .split(|ch: char| !ch.is_ascii_digit())
        .find_map(|part| {
            (!part.is_empty())
                .then(|| part.parse::<u32>().ok())
                .flatten()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn td_error(code: i32, message: &str) -> types::Error {
        types::Error {
            code,
            message: message.to_owned(),
        }
    }

    #[test]
    fn detects_recoverable_code_rejections() {
        assert!(is_invalid_code_error("PHONE_CODE_INVALID"));
        assert!(is_invalid_code_error("phone_code_empty"));
        assert!(!is_invalid_code_error("PHONE_CODE_EXPIRED"));
        assert!(!is_invalid_code_error("PHONE_NUMBER_INVALID"));
    }

    #[test]
    fn detects_wrong_password() {
        assert!(is_wrong_password_error("PASSWORD_HASH_INVALID"));
        assert!(!is_wrong_password_error("Unauthorized"));
    }

    #[test]
    fn extracts_retry_after_seconds() {
        assert_eq!(
            retry_after_seconds(&td_error(429, "Too Many Requests: retry after 67")),
            Some(67)
        );
        assert_eq!(
            retry_after_seconds(&td_error(400, "FLOOD_WAIT_30")),
            Some(30)
        );
        assert_eq!(
            retry_after_seconds(&td_error(400, "PHONE_CODE_INVALID")),
            None
        );
    }

    #[test]
    fn engine_error_keeps_message_verbatim() {
        let error = report_error(td_error(400, "PHONE_NUMBER_INVALID"));

        assert!(matches!(error, EngineError::Remote { code: 400, .. }));
        assert_eq!(error.to_string(), "PHONE_NUMBER_INVALID");
    }

    #[test]
    fn maps_engine_states_to_domain_states() {
        let cases = [
            (
                enums::AuthorizationState::WaitTdlibParameters,
                AuthorizationState::Unauthenticated,
            ),
            (
                enums::AuthorizationState::WaitPhoneNumber,
                AuthorizationState::AwaitingPhone,
            ),
            (enums::AuthorizationState::Ready, AuthorizationState::Ready),
            (
                enums::AuthorizationState::LoggingOut,
                AuthorizationState::LoggingOut,
            ),
            (
                enums::AuthorizationState::Closing,
                AuthorizationState::LoggedOut,
            ),
            (
                enums::AuthorizationState::Closed,
                AuthorizationState::LoggedOut,
            ),
        ];

        for (engine_state, expected) in cases {
            assert_eq!(map_authorization_state(&engine_state), expected);
        }
    }

    #[test]
    fn default_prompt_names_the_request() {
        let request = InputRequest::new(InputRequestKind::parse(EMAIL_CODE_REQUEST));
        assert_eq!(default_prompt(&request), "Enter email code: ");
    }

    #[test]
    fn phone_numbers_get_international_prefix() {
        assert_eq!(format_phone("15551234567"), "+15551234567");
        assert_eq!(format_phone("+1000"), "+1000");
        assert_eq!(format_phone(""), "");
    }
}
