//! Error taxonomy for a submodule update run.
//!
//! Every variant is fatal for the run except where the orchestrator says
//! otherwise. The binary maps the innermost error to a message and exit code.

use crate::repo::UpdateStep;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The external process could not be started, wrote to stderr, or exited non-zero.
    #[error("The command: {command}, returned an error: {message}")]
    Execution { command: String, message: String },

    #[error("Path [{}] does not exist. {context}", path.display())]
    PathNotFound { path: PathBuf, context: String },

    #[error("Branch {branch} is an unknown branch. Known branches are: [{}]", known.join(", "))]
    UnknownBranch { branch: String, known: Vec<String> },

    #[error("Invalid branch name: {0:?}")]
    InvalidBranchName(String),

    /// `git submodule status` did not contain a `-<sha> ` entry.
    #[error("Submodule status for '{path}' could not be parsed: {output:?}")]
    SubmoduleStatus { path: String, output: String },

    #[error("Aborted by user")]
    UserAbort,

    #[error("Commit message must not be empty")]
    EmptyCommitMessage,

    #[error("Cannot run an empty command")]
    InvalidCommand,

    #[error("Settings error in {}: {message}", path.display())]
    Settings { path: PathBuf, message: String },

    #[error("{context} [{}]: {source}", path.display())]
    Io {
        path: PathBuf,
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read input: {0}")]
    Prompt(String),

    /// Attaches the repo and orchestration step an error happened at.
    #[error("{repo} failed at {step}: {source}")]
    Step {
        repo: String,
        step: UpdateStep,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Innermost error, looking through any `Step` wrappers.
    #[must_use]
    pub fn root(&self) -> &Error {
        match self {
            Error::Step { source, .. } => source.root(),
            other => other,
        }
    }

    #[must_use]
    pub fn is_user_abort(&self) -> bool {
        matches!(self.root(), Error::UserAbort)
    }

    pub(crate) fn io(path: impl Into<PathBuf>, context: &'static str, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            context,
            source,
        }
    }
}
