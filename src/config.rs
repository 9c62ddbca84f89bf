//! Run options derived from CLI arguments.

use crate::command::{self, CommandLogger};

/// Per-run options; immutable once parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Print diagnostics and every git command issued.
    pub verbose: bool,
    /// Ask "Continue? [y/N]" before clone, commit and other state-changing steps.
    pub prompt: bool,
}

impl RunOptions {
    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    #[must_use]
    pub fn prompts_before_changes(&self) -> bool {
        self.prompt
    }

    /// Spinners only draw when nothing else writes to the terminal mid-step.
    #[must_use]
    pub fn shows_spinner(&self) -> bool {
        !self.verbose && !self.prompt
    }

    /// Returns the command logger matching the verbosity.
    ///
    /// Config only chooses which logger runs; the logging itself lives
    /// next to the command runner.
    #[must_use]
    pub fn command_logger(&self) -> CommandLogger {
        if self.is_verbose() {
            command::verbose_logger
        } else {
            command::no_op_logger
        }
    }
}
