//! External process execution.
//!
//! Commands are argument vectors bound to an explicit working directory.
//! Nothing here goes through a shell or touches the process working directory.

use crate::error::{Error, Result};
use colored::Colorize;
use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};

/// Logs a command right before it runs.
pub type CommandLogger = fn(&Path, &CommandLine);

/// A program plus its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds a command from `[program, args...]`; the list must not be empty.
    pub fn from_parts(parts: &[&str]) -> Result<Self> {
        match parts.split_first() {
            Some((program, args)) if !program.is_empty() => {
                Ok(Self::new(program, args.iter().copied()))
            }
            _ => Err(Error::InvalidCommand),
        }
    }

    pub fn git(args: &[&str]) -> Self {
        Self::new("git", args.iter().copied())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl From<&str> for CommandLine {
    fn from(program: &str) -> Self {
        Self::new(program, std::iter::empty::<String>())
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs one external command and returns its captured stdout.
pub trait CommandRunner {
    fn run(&self, dir: &Path, command: &CommandLine) -> Result<String>;
}

/// Runs commands as real child processes.
///
/// A command fails if it cannot be spawned, exits non-zero, or writes
/// anything at all to stderr.
pub struct SystemRunner {
    logger: CommandLogger,
}

impl SystemRunner {
    pub fn new(logger: CommandLogger) -> Self {
        Self { logger }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, dir: &Path, command: &CommandLine) -> Result<String> {
        (self.logger)(dir, command);

        let output = Command::new(command.program())
            .args(command.args())
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::Execution {
                command: command.to_string(),
                message: format!("failed to spawn: {}", e),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            return Err(Error::Execution {
                command: command.to_string(),
                message: format!("returned error[{}]", stderr.trim_end()),
            });
        }

        if !output.status.success() {
            return Err(Error::Execution {
                command: command.to_string(),
                message: format!("exited with {}", output.status),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

pub fn no_op_logger(_dir: &Path, _command: &CommandLine) {}

pub fn verbose_logger(dir: &Path, command: &CommandLine) {
    eprintln!("{}", format!("{}> {}", dir.display(), command).cyan().dimmed());
}
