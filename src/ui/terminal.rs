use std::io::{self, Write};

use crossterm::style::Stylize;

use crate::usecases::contracts::{AuthTerminal, Tone};

/// Line-oriented stdio terminal. Passwords are read without echo.
#[derive(Debug, Default)]
pub struct StdTerminal;

impl AuthTerminal for StdTerminal {
    fn print_line(&mut self, line: &str) -> io::Result<()> {
        println!("{line}");
        Ok(())
    }

    fn print_error(&mut self, line: &str) -> io::Result<()> {
        eprintln!("{}", line.red());
        Ok(())
    }

    fn print_toned(&mut self, tone: Tone, line: &str) -> io::Result<()> {
        match tone {
            Tone::Banner => println!("{}", line.blue()),
            Tone::Success => println!("{}", line.green()),
            Tone::Warning => println!("{}", line.yellow()),
            Tone::Failure => println!("{}", line.red()),
            Tone::Plain => println!("{line}"),
        }
        Ok(())
    }

    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        print!("{prompt}");
        io::stdout().flush()?;

        let mut line = String::new();
        let bytes = io::stdin().read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim().to_owned()))
    }

    fn prompt_secret(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match rpassword::prompt_password(prompt) {
            Ok(password) => Ok(Some(password.trim().to_owned())),
            Err(source) if source.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(source) => Err(source),
        }
    }
}
