use std::{io, process::ExitCode};

use anyhow::Result;
use clap::CommandFactory;

use crate::{
    cli::{Cli, Command},
    domain, infra,
    telegram::{self, TdlibEngine},
    ui::{
        self,
        report::{self, failure_line, LOGIN_BANNER, LOGOUT_BANNER, STATUS_BANNER},
        terminal::StdTerminal,
    },
    usecases::{
        self, bootstrap,
        context::AppContext,
        contracts::{AuthTerminal, EngineError, EngineParameters, SessionEngine, Tone},
        logout::confirm_logout,
        session::{SessionAdapter, SessionError},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    Failure,
}

impl From<CommandOutcome> for ExitCode {
    fn from(outcome: CommandOutcome) -> Self {
        match outcome {
            CommandOutcome::Success => ExitCode::SUCCESS,
            CommandOutcome::Failure => ExitCode::FAILURE,
        }
    }
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(ExitCode::SUCCESS);
    };

    let (context, _logging) = bootstrap::bootstrap(cli.config.as_deref())?;

    tracing::debug!(
        ui = ui::module_name(),
        domain = domain::module_name(),
        telegram = telegram::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        ?command,
        "module boundaries loaded"
    );

    let mut terminal = StdTerminal;
    Ok(dispatch(command, &context, &mut terminal, TdlibEngine::start).into())
}

/// Runs one command through one adapter lifecycle. The adapter is closed on
/// every path that opened it.
pub fn dispatch<E, F>(
    command: Command,
    context: &AppContext,
    terminal: &mut dyn AuthTerminal,
    connect: F,
) -> CommandOutcome
where
    E: SessionEngine,
    F: FnOnce(&EngineParameters) -> Result<E, EngineError>,
{
    let result = match command {
        Command::Login => login(context, terminal, connect),
        Command::Logout => logout(context, terminal, connect),
        Command::Status => status(context, terminal, connect),
    };

    result.unwrap_or_else(|error| {
        tracing::error!(%error, ?command, "terminal output failed");
        CommandOutcome::Failure
    })
}

fn with_adapter<E, F, T, Op>(context: &AppContext, connect: F, operation: Op) -> Result<T, SessionError>
where
    E: SessionEngine,
    F: FnOnce(&EngineParameters) -> Result<E, EngineError>,
    Op: FnOnce(&mut SessionAdapter<E>) -> Result<T, SessionError>,
{
    let mut adapter = SessionAdapter::open(&context.config, &context.layout, connect)?;
    let result = operation(&mut adapter);
    adapter.close();
    result
}

fn login<E, F>(
    context: &AppContext,
    terminal: &mut dyn AuthTerminal,
    connect: F,
) -> io::Result<CommandOutcome>
where
    E: SessionEngine,
    F: FnOnce(&EngineParameters) -> Result<E, EngineError>,
{
    terminal.print_toned(Tone::Banner, LOGIN_BANNER)?;
    terminal.print_line("")?;

    match with_adapter(context, connect, |adapter| adapter.login()) {
        Ok(()) => {
            terminal.print_toned(Tone::Success, "✓ Login successful!")?;
            Ok(CommandOutcome::Success)
        }
        Err(error) => report_failure(terminal, "Login", &error),
    }
}

fn logout<E, F>(
    context: &AppContext,
    terminal: &mut dyn AuthTerminal,
    connect: F,
) -> io::Result<CommandOutcome>
where
    E: SessionEngine,
    F: FnOnce(&EngineParameters) -> Result<E, EngineError>,
{
    terminal.print_toned(Tone::Banner, LOGOUT_BANNER)?;
    terminal.print_line("")?;

    if !confirm_logout(terminal)? {
        terminal.print_toned(Tone::Warning, "Logout cancelled.")?;
        return Ok(CommandOutcome::Success);
    }

    match with_adapter(context, connect, |adapter| adapter.logout()) {
        Ok(()) => {
            terminal.print_toned(Tone::Success, "✓ Logout successful!")?;
            Ok(CommandOutcome::Success)
        }
        Err(error) => report_failure(terminal, "Logout", &error),
    }
}

fn status<E, F>(
    context: &AppContext,
    terminal: &mut dyn AuthTerminal,
    connect: F,
) -> io::Result<CommandOutcome>
where
    E: SessionEngine,
    F: FnOnce(&EngineParameters) -> Result<E, EngineError>,
{
    terminal.print_toned(Tone::Banner, STATUS_BANNER)?;
    terminal.print_line("")?;

    match with_adapter(context, connect, |adapter| adapter.get_status()) {
        Ok(status) => {
            tracing::debug!(auth_state = status.auth_state.as_label(), "status queried");
            for (tone, line) in report::status_lines(&status) {
                terminal.print_toned(tone, &line)?;
            }
            Ok(CommandOutcome::Success)
        }
        Err(error) => report_failure(terminal, "Status check", &error),
    }
}

fn report_failure(
    terminal: &mut dyn AuthTerminal,
    operation: &str,
    error: &SessionError,
) -> io::Result<CommandOutcome> {
    tracing::debug!(%error, operation, "command failed");
    terminal.print_error(&failure_line(operation, error))?;
    Ok(CommandOutcome::Failure)
}
