use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "telertx",
    version,
    about = "Simple Telegram CLI client with login/logout functionality"
)]
pub struct Cli {
    /// Path to config file (default: <config dir>/telertx/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Login to Telegram
    Login,
    /// Logout from Telegram
    Logout,
    /// Check login status
    Status,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Command};

    #[test]
    fn command_is_optional() {
        let cli = Cli::parse_from(["telertx"]);

        assert_eq!(cli.command, None);
    }

    #[test]
    fn parses_each_subcommand() {
        for (arg, expected) in [
            ("login", Command::Login),
            ("logout", Command::Logout),
            ("status", Command::Status),
        ] {
            let cli = Cli::parse_from(["telertx", arg]);
            assert_eq!(cli.command, Some(expected));
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["telertx", "status", "--config", "custom.toml"]);

        assert_eq!(cli.command, Some(Command::Status));
        assert_eq!(
            cli.config
                .as_deref()
                .map(|p| p.to_string_lossy().to_string()),
            Some("custom.toml".to_owned())
        );
    }

    #[test]
    fn subcommands_take_no_flags() {
        assert!(Cli::try_parse_from(["telertx", "login", "--force"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
