use thiserror::Error;

use crate::{
    domain::status::SessionStatus,
    infra::{
        config::{AppConfig, Credentials},
        error::AppError,
        storage_layout::{SessionLock, StorageLayout},
    },
    usecases::{
        contracts::{EngineError, EngineParameters, SessionEngine},
        input_routing::PromptRouter,
    },
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] AppError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Owns the one live engine handle of this process and routes the engine's
/// input requests to terminal prompts.
///
/// The handle is released by [`SessionAdapter::close`], which also runs on drop.
pub struct SessionAdapter<E: SessionEngine> {
    engine: Option<E>,
    router: PromptRouter,
    lock: Option<SessionLock>,
}

impl<E: SessionEngine> std::fmt::Debug for SessionAdapter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAdapter")
            .field("open", &self.engine.is_some())
            .field("router", &self.router)
            .finish()
    }
}

impl<E: SessionEngine> SessionAdapter<E> {
    /// Validates credentials, prepares the state directory and starts the engine.
    ///
    /// `connect` is never invoked when configuration is incomplete.
    pub fn open<F>(config: &AppConfig, layout: &StorageLayout, connect: F) -> Result<Self, SessionError>
    where
        F: FnOnce(&EngineParameters) -> Result<E, EngineError>,
    {
        let credentials = config.telegram.credentials()?;
        layout.ensure_state_dir()?;
        let lock = SessionLock::acquire(&layout.lock_file())?;

        let parameters = engine_parameters(&credentials, config, layout);
        tracing::debug!(?parameters, "starting session engine");
        let engine = connect(&parameters)?;

        Ok(Self {
            engine: Some(engine),
            router: PromptRouter::stdio(),
            lock: Some(lock),
        })
    }

    pub fn with_router(mut self, router: PromptRouter) -> Self {
        self.router = router;
        self
    }

    /// Blocks until the engine reports an authorized session.
    pub fn login(&mut self) -> Result<(), SessionError> {
        let engine = self.engine.as_mut().ok_or(EngineError::Closed)?;

        let result = engine.wait_ready(&mut self.router);
        self.router.release_terminal();

        result?;
        tracing::info!("authorization completed");
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        let engine = self.engine.as_mut().ok_or(EngineError::Closed)?;
        engine.log_out()?;
        tracing::info!("logged out");
        Ok(())
    }

    pub fn get_status(&mut self) -> Result<SessionStatus, SessionError> {
        let engine = self.engine.as_mut().ok_or(EngineError::Closed)?;

        let auth_state = engine.authorization_state()?;
        if !auth_state.is_ready() {
            return Ok(SessionStatus::not_logged_in(auth_state));
        }

        let user = engine.current_user()?;
        Ok(SessionStatus::logged_in(user))
    }

    /// Idempotent. Teardown failures are logged and otherwise ignored.
    pub fn close(&mut self) {
        self.router.release_terminal();

        if let Some(mut engine) = self.engine.take() {
            if let Err(error) = engine.close() {
                tracing::debug!(%error, "session engine teardown failed");
            }
        }

        self.lock.take();
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        self.engine.is_some()
    }
}

impl<E: SessionEngine> Drop for SessionAdapter<E> {
    fn drop(&mut self) {
        self.close();
    }
}

fn engine_parameters(
    credentials: &Credentials,
    config: &AppConfig,
    layout: &StorageLayout,
) -> EngineParameters {
    EngineParameters {
        api_id: credentials.api_id,
        api_hash: credentials.api_hash.clone(),
        database_dir: layout.database_dir.clone(),
        files_dir: layout.files_dir.clone(),
        database_encryption_key: config.telegram.database_encryption_key.clone(),
        use_test_dc: config.telegram.use_test_dc,
        use_file_database: true,
        use_chat_info_database: true,
        use_message_database: true,
        use_secret_chats: false,
        system_language_code: config.telegram.system_language_code.clone(),
        device_model: config.telegram.device_model.clone(),
        application_version: env!("CARGO_PKG_VERSION").to_owned(),
        log_verbosity: config.telegram.log_verbosity,
        shutdown_timeout_ms: config.engine.shutdown_timeout_ms,
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{
        domain::{
            auth_state::AuthorizationState,
            input::{InputRequest, InputRequestKind},
            user::UserProfile,
        },
        test_support::{configured_app, FakeEngine, FakeTerminal},
    };

    fn ada() -> UserProfile {
        UserProfile {
            first_name: "Ada".to_owned(),
            last_name: None,
            phone_number: "+1000".to_owned(),
            username: None,
        }
    }

    #[test]
    fn missing_credentials_fail_before_engine_is_started() {
        let (mut config, layout, _dir) = configured_app();
        config.telegram.api_hash = None;
        let connects = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&connects);
        let result = SessionAdapter::open(&config, &layout, |_| {
            *counter.borrow_mut() += 1;
            Ok(FakeEngine::new(AuthorizationState::AwaitingPhone))
        });

        assert!(matches!(
            result,
            Err(SessionError::Config(AppError::MissingCredentials))
        ));
        assert_eq!(*connects.borrow(), 0);
        assert!(!layout.state_dir.exists());
    }

    #[test]
    fn open_creates_state_dir_and_passes_storage_parameters() {
        let (config, layout, _dir) = configured_app();
        let seen = Rc::new(RefCell::new(None));

        let captured = Rc::clone(&seen);
        let adapter = SessionAdapter::open(&config, &layout, |parameters| {
            *captured.borrow_mut() = Some(parameters.clone());
            Ok(FakeEngine::new(AuthorizationState::AwaitingPhone))
        })
        .expect("adapter should open");

        assert!(adapter.is_open());
        assert!(layout.state_dir.is_dir());

        let parameters = seen.borrow().clone().expect("engine received parameters");
        assert_eq!(parameters.api_id, 12345);
        assert_eq!(parameters.database_dir, layout.database_dir);
        assert_eq!(parameters.files_dir, layout.files_dir);
        assert!(!parameters.use_secret_chats);
        assert!(parameters.use_chat_info_database);
        assert!(parameters.use_message_database);
    }

    #[test]
    fn second_adapter_on_same_store_is_rejected() {
        let (config, layout, _dir) = configured_app();
        let _first = SessionAdapter::open(&config, &layout, |_| {
            Ok(FakeEngine::new(AuthorizationState::Ready))
        })
        .expect("first adapter");

        let second = SessionAdapter::open(&config, &layout, |_| {
            Ok(FakeEngine::new(AuthorizationState::Ready))
        });

        assert!(matches!(
            second,
            Err(SessionError::Config(AppError::SessionStoreBusy { .. }))
        ));
    }

    #[test]
    fn status_has_no_user_unless_ready() {
        let (config, layout, _dir) = configured_app();
        let engine = FakeEngine::new(AuthorizationState::AwaitingCode).with_user(ada());
        let calls = engine.calls();
        let mut adapter =
            SessionAdapter::open(&config, &layout, |_| Ok(engine)).expect("adapter");

        let status = adapter.get_status().expect("status query");

        assert!(!status.is_logged_in);
        assert_eq!(status.user, None);
        assert_eq!(status.auth_state, AuthorizationState::AwaitingCode);
        assert_eq!(calls.borrow().user_queries, 0);
    }

    #[test]
    fn status_includes_profile_when_ready() {
        let (config, layout, _dir) = configured_app();
        let engine = FakeEngine::new(AuthorizationState::Ready).with_user(ada());
        let mut adapter =
            SessionAdapter::open(&config, &layout, |_| Ok(engine)).expect("adapter");

        let status = adapter.get_status().expect("status query");

        assert!(status.is_logged_in);
        assert_eq!(status.user, Some(ada()));
        assert_eq!(status.auth_state, AuthorizationState::Ready);
    }

    #[test]
    fn status_query_failure_propagates_engine_message() {
        let (config, layout, _dir) = configured_app();
        let engine = FakeEngine::new(AuthorizationState::Ready).failing_status("Request aborted");
        let mut adapter =
            SessionAdapter::open(&config, &layout, |_| Ok(engine)).expect("adapter");

        let err = adapter.get_status().expect_err("status must fail");

        assert_eq!(err.to_string(), "Request aborted");
    }

    #[test]
    fn login_routes_requests_and_releases_terminal() {
        let (config, layout, _dir) = configured_app();
        let engine = FakeEngine::new(AuthorizationState::AwaitingPhone).with_login_requests(vec![
            InputRequest::new(InputRequestKind::AuthorizationType),
            InputRequest::new(InputRequestKind::AuthorizationValue),
            InputRequest::new(InputRequestKind::AuthorizationCode),
            InputRequest::new(InputRequestKind::AuthorizationPassword).with_hint("pet name"),
        ]);
        let answers = engine.answers();
        let terminal = FakeTerminal::new(vec![Some("+1000"), Some("12345"), Some("hunter2")]);
        let log = terminal.log();

        let mut adapter = SessionAdapter::open(&config, &layout, |_| Ok(engine))
            .expect("adapter")
            .with_router(PromptRouter::new(move || Box::new(terminal.clone())));

        adapter.login().expect("login should succeed");

        assert_eq!(
            *answers.borrow(),
            vec!["user", "+1000", "12345", "hunter2"]
        );
        assert_eq!(log.borrow().prompts.len(), 3);
        assert!(log.borrow().prompts[2].contains("pet name"));
        assert!(!adapter.router.has_terminal());
    }

    #[test]
    fn login_failure_propagates_and_still_releases_terminal() {
        let (config, layout, _dir) = configured_app();
        let engine = FakeEngine::new(AuthorizationState::AwaitingPhone)
            .with_login_requests(vec![InputRequest::new(InputRequestKind::AuthorizationValue)])
            .failing_login("PHONE_NUMBER_INVALID");
        let terminal = FakeTerminal::new(vec![Some("+1")]);

        let mut adapter = SessionAdapter::open(&config, &layout, |_| Ok(engine))
            .expect("adapter")
            .with_router(PromptRouter::new(move || Box::new(terminal.clone())));

        let err = adapter.login().expect_err("login must fail");

        assert_eq!(err.to_string(), "PHONE_NUMBER_INVALID");
        assert!(!adapter.router.has_terminal());
    }

    #[test]
    fn unknown_request_falls_back_to_engine_default_prompt() {
        let (config, layout, _dir) = configured_app();
        let engine = FakeEngine::new(AuthorizationState::AwaitingEmail)
            .with_login_requests(vec![InputRequest::new(InputRequestKind::parse("email-address"))]);
        let answers = engine.answers();
        let terminal = FakeTerminal::new(vec![Some("ada@example.com")]);
        let log = terminal.log();

        let mut adapter = SessionAdapter::open(&config, &layout, |_| Ok(engine))
            .expect("adapter")
            .with_router(PromptRouter::new(move || Box::new(terminal.clone())));

        adapter.login().expect("login should succeed");

        assert_eq!(*answers.borrow(), vec!["ada@example.com"]);
        assert_eq!(log.borrow().prompts, vec!["Enter email-address: "]);
    }

    #[test]
    fn close_is_idempotent_and_swallows_teardown_errors() {
        let (config, layout, _dir) = configured_app();
        let engine = FakeEngine::new(AuthorizationState::Ready).failing_close("already closed");
        let calls = engine.calls();
        let mut adapter =
            SessionAdapter::open(&config, &layout, |_| Ok(engine)).expect("adapter");

        adapter.close();
        adapter.close();
        drop(adapter);

        assert_eq!(calls.borrow().closes, 1);
    }

    #[test]
    fn operations_after_close_report_closed_engine() {
        let (config, layout, _dir) = configured_app();
        let engine = FakeEngine::new(AuthorizationState::Ready);
        let calls = engine.calls();
        let mut adapter =
            SessionAdapter::open(&config, &layout, |_| Ok(engine)).expect("adapter");

        adapter.close();

        assert!(matches!(
            adapter.logout(),
            Err(SessionError::Engine(EngineError::Closed))
        ));
        assert_eq!(calls.borrow().log_outs, 0);
    }

    #[test]
    fn close_releases_session_lock() {
        let (config, layout, _dir) = configured_app();
        let mut first = SessionAdapter::open(&config, &layout, |_| {
            Ok(FakeEngine::new(AuthorizationState::Ready))
        })
        .expect("first adapter");

        first.close();

        SessionAdapter::open(&config, &layout, |_| Ok(FakeEngine::new(AuthorizationState::Ready)))
            .expect("store is free after close");
    }
}
