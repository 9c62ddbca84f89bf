//! Command-line flags.

use crate::config::RunOptions;
use clap::Parser;

/// Bump a shared submodule to its target branch HEAD across many repos,
/// committing and pushing the bump on each.
#[derive(Parser, Debug, Default)]
#[command(name = "submodule-update")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Verbose output, including every git command issued
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Prompt to continue before clone, commit and push
    #[arg(short = 'p')]
    pub prompt: bool,
}

impl Cli {
    #[must_use]
    pub fn options(&self) -> RunOptions {
        RunOptions {
            verbose: self.verbose,
            prompt: self.prompt,
        }
    }
}
