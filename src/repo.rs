// Submodule update orchestration: target resolution, per-repo currency check, update/commit/push

use crate::command::CommandRunner;
use crate::config::RunOptions;
use crate::error::{Error, Result};
use crate::git;
use crate::output::MessageLevel;
use crate::prompt::{self, CONTINUE_PROMPT, Prompter};
use crate::settings::{RepoDescriptor, Settings};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStep {
    ResolvingTarget,
    Cloning,
    CheckingOut,
    CheckingSubmodule,
    InitializingSubmodule,
    PullingSubmodule,
    Committing,
    Pushing,
}

impl fmt::Display for UpdateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UpdateStep::ResolvingTarget => "resolving target sha",
            UpdateStep::Cloning => "cloning",
            UpdateStep::CheckingOut => "checking out branch",
            UpdateStep::CheckingSubmodule => "checking submodule status",
            UpdateStep::InitializingSubmodule => "initializing submodule",
            UpdateStep::PullingSubmodule => "pulling submodule",
            UpdateStep::Committing => "committing",
            UpdateStep::Pushing => "pushing",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    /// Submodule pointer already matched the target; nothing committed.
    UpToDate,
    /// Pointer moved, committed and pushed.
    Updated { submodule_sha: String },
}

#[derive(Debug, Clone)]
pub struct RepoResult {
    pub repo: RepoDescriptor,
    pub outcome: RepoOutcome,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub target_sha: String,
    pub results: Vec<RepoResult>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn updated(&self) -> impl Iterator<Item = &RepoResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, RepoOutcome::Updated { .. }))
    }

    pub fn up_to_date(&self) -> impl Iterator<Item = &RepoResult> {
        self.results
            .iter()
            .filter(|r| r.outcome == RepoOutcome::UpToDate)
    }
}

/// Progress hooks for a run. Every method but `on_step` defaults to a no-op.
pub trait UpdateCallbacks {
    fn on_repo_start(&self, _repo: &str) {}
    fn on_step(&self, repo: &str, step: UpdateStep);
    fn on_message(&self, _level: MessageLevel, _message: &str) {}
    fn on_repo_complete(&self, _result: &RepoResult) {}
    fn on_repo_failed(&self, _repo: &str, _error: &Error) {}
}

fn at_step<T>(repo: &str, step: UpdateStep, result: Result<T>) -> Result<T> {
    result.map_err(|e| Error::Step {
        repo: repo.to_string(),
        step,
        source: Box::new(e),
    })
}

/// Whether the `-<sha>` entry in submodule status output equals `target_sha` exactly.
pub fn pointer_matches(status_output: &str, path: &str, target_sha: &str) -> Result<bool> {
    let sha = git::parse_submodule_sha(status_output).ok_or_else(|| Error::SubmoduleStatus {
        path: path.to_string(),
        output: status_output.to_string(),
    })?;
    Ok(sha == target_sha)
}

fn assert_path_exists(path: &Path, context: String) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::PathNotFound {
            path: path.to_path_buf(),
            context,
        })
    }
}

/// Propagates the target submodule's branch HEAD into the selected repos.
///
/// Runs strictly sequentially. Every git command is issued against an
/// explicit directory under the build dir, so nothing depends on the
/// process working directory.
pub struct Updater<'a> {
    settings: &'a Settings,
    options: RunOptions,
    runner: &'a dyn CommandRunner,
    prompter: &'a dyn Prompter,
    callbacks: &'a dyn UpdateCallbacks,
}

impl<'a> Updater<'a> {
    pub fn new(
        settings: &'a Settings,
        options: RunOptions,
        runner: &'a dyn CommandRunner,
        prompter: &'a dyn Prompter,
        callbacks: &'a dyn UpdateCallbacks,
    ) -> Self {
        Self {
            settings,
            options,
            runner,
            prompter,
            callbacks,
        }
    }

    fn verbose(&self, message: String) {
        self.callbacks.on_message(MessageLevel::Verbose, &message);
    }

    /// Removes the build directory if present, then recreates it empty.
    pub fn fresh_build_directory(&self) -> Result<()> {
        let build_dir = &self.settings.build_dir;
        if build_dir.exists() {
            self.verbose(format!("Removing build dir at: {}", build_dir.display()));
            std::fs::remove_dir_all(build_dir)
                .map_err(|e| Error::io(build_dir, "Failed to remove build dir", e))?;
        }
        self.verbose(format!("Creating build dir at: {}", build_dir.display()));
        std::fs::create_dir_all(build_dir)
            .map_err(|e| Error::io(build_dir, "Failed to create build dir", e))
    }

    /// Clones `{base}/{name}.git` into `{build_dir}/{name}` and returns that path.
    /// A clone left by an earlier pass over the same repo is replaced.
    pub fn clone_repo(&self, name: &str) -> Result<PathBuf> {
        let url = self.settings.clone_url(name);
        let target = self.settings.repo_dir(name);
        self.verbose(format!(
            "Cloning Repo: '{}' to: '{}'",
            name,
            target.display()
        ));
        prompt::confirm_or_abort(
            self.prompter,
            &self.options,
            &format!("Clone {} into {}. {}", url, target.display(), CONTINUE_PROMPT),
        )?;
        if target.exists() {
            self.verbose(format!("Removing earlier clone at: {}", target.display()));
            std::fs::remove_dir_all(&target)
                .map_err(|e| Error::io(&target, "Failed to remove earlier clone", e))?;
        }
        git::clone(self.runner, &self.settings.build_dir, &url, &target)?;
        assert_path_exists(
            &target,
            format!("This is the expected path to the repo: {}", name),
        )?;
        Ok(target)
    }

    /// Ensures `branch` is known in `repo_dir`, checks it out unless already
    /// on it, and returns its HEAD sha.
    pub fn resolve_branch_head(&self, repo_dir: &Path, branch: &str) -> Result<String> {
        self.verbose(format!(
            "Asserting branch: '{}' is a known branch for this repo",
            branch
        ));
        git::assert_known_branch(self.runner, repo_dir, branch)?;

        let current = git::get_current_branch(self.runner, repo_dir)?;
        if current == branch {
            self.verbose(format!(
                "Already on branch '{}', no need to checkout to that branch",
                branch
            ));
        } else {
            git::checkout(self.runner, repo_dir, branch)?;
        }
        git::head_sha(self.runner, repo_dir)
    }

    pub fn is_submodule_current(
        &self,
        repo_dir: &Path,
        relative_path: &str,
        target_sha: &str,
    ) -> Result<bool> {
        let status = git::submodule_status(self.runner, repo_dir, relative_path)?;
        self.verbose(status.trim_end().to_string());
        pointer_matches(&status, relative_path, target_sha)
    }

    /// Clones the target submodule's own repo and resolves its target branch HEAD.
    pub fn resolve_target_sha(&self) -> Result<String> {
        let name = &self.settings.target_submodule_name;
        let branch = &self.settings.target_submodule_target_branch;
        self.verbose(format!(
            "First, determining the sha for the HEAD of branch '{}' of the submodule repo '{}'",
            branch, name
        ));
        self.callbacks.on_repo_start(name);

        self.callbacks.on_step(name, UpdateStep::Cloning);
        let dir = at_step(name, UpdateStep::Cloning, self.clone_repo(name))?;

        self.callbacks.on_step(name, UpdateStep::ResolvingTarget);
        let sha = at_step(
            name,
            UpdateStep::ResolvingTarget,
            self.resolve_branch_head(&dir, branch),
        )?;
        self.callbacks.on_message(
            MessageLevel::Normal,
            &format!("{} {} sha is: {}", name, branch, sha),
        );
        Ok(sha)
    }

    /// Runs the whole update: commit message, fresh build dir, target sha,
    /// then each selected repo in order. The first error ends the run; a
    /// blank commit message ends it before anything is touched.
    pub fn process_repos(&self, selected: &[RepoDescriptor]) -> Result<RunSummary> {
        let started = Instant::now();
        let commit_message = self.prompter.read_line(&format!(
            "Commit message (used on each repo to describe updating the '{}' submodule)",
            self.settings.target_submodule_name
        ))?;
        if commit_message.trim().is_empty() {
            return Err(Error::EmptyCommitMessage);
        }

        self.fresh_build_directory()?;
        let target_sha = self.resolve_target_sha()?;

        let mut results = Vec::with_capacity(selected.len());
        for repo in selected {
            let repo_started = Instant::now();
            self.callbacks.on_repo_start(&repo.name);
            match self.update_repo(repo, &commit_message, &target_sha) {
                Ok(outcome) => {
                    let result = RepoResult {
                        repo: repo.clone(),
                        outcome,
                        duration: repo_started.elapsed(),
                    };
                    self.callbacks.on_repo_complete(&result);
                    results.push(result);
                }
                Err(e) => {
                    self.callbacks.on_repo_failed(&repo.name, &e);
                    return Err(e);
                }
            }
        }

        Ok(RunSummary {
            target_sha,
            results,
            duration: started.elapsed(),
        })
    }

    fn update_repo(
        &self,
        repo: &RepoDescriptor,
        commit_message: &str,
        target_sha: &str,
    ) -> Result<RepoOutcome> {
        let name = repo.name.as_str();
        let submodule_path = self.settings.submodule_path_for(repo);

        self.callbacks.on_step(name, UpdateStep::Cloning);
        let repo_dir = at_step(name, UpdateStep::Cloning, self.clone_repo(name))?;

        self.callbacks.on_step(name, UpdateStep::CheckingOut);
        at_step(
            name,
            UpdateStep::CheckingOut,
            self.resolve_branch_head(&repo_dir, &repo.branch),
        )?;

        self.callbacks.on_step(name, UpdateStep::CheckingSubmodule);
        let current = at_step(
            name,
            UpdateStep::CheckingSubmodule,
            self.is_submodule_current(&repo_dir, submodule_path, target_sha),
        )?;
        if current {
            self.callbacks.on_message(
                MessageLevel::Warn,
                &format!(
                    "The repo: {} submodule {} is already up to date. Skipping",
                    name, self.settings.target_submodule_name
                ),
            );
            return Ok(RepoOutcome::UpToDate);
        }

        self.callbacks.on_step(name, UpdateStep::InitializingSubmodule);
        let submodule_dir = repo_dir.join(submodule_path);
        at_step(
            name,
            UpdateStep::InitializingSubmodule,
            self.init_submodule(&repo_dir, &submodule_dir, submodule_path),
        )?;

        self.callbacks.on_step(name, UpdateStep::PullingSubmodule);
        let submodule_sha = at_step(
            name,
            UpdateStep::PullingSubmodule,
            self.pull_target_branch(&submodule_dir),
        )?;

        self.callbacks.on_step(name, UpdateStep::Committing);
        at_step(
            name,
            UpdateStep::Committing,
            self.commit_pointer(&repo_dir, name, submodule_path, commit_message),
        )?;

        self.callbacks.on_step(name, UpdateStep::Pushing);
        at_step(
            name,
            UpdateStep::Pushing,
            self.push_branch(&repo_dir, name, &repo.branch),
        )?;

        Ok(RepoOutcome::Updated { submodule_sha })
    }

    fn init_submodule(&self, repo_dir: &Path, submodule_dir: &Path, relative_path: &str) -> Result<()> {
        assert_path_exists(
            submodule_dir,
            format!(
                "This is the expected path to the {} submodule",
                self.settings.target_submodule_name
            ),
        )?;
        self.verbose(format!(
            "Initializing submodule at path: '{}'",
            submodule_dir.display()
        ));
        git::submodule_init(self.runner, repo_dir, relative_path)
    }

    /// Pulls the target branch to latest inside the submodule; returns its new HEAD.
    fn pull_target_branch(&self, submodule_dir: &Path) -> Result<String> {
        let branch = &self.settings.target_submodule_target_branch;
        self.verbose(format!(
            "Update branch: '{}' to the latest on origin",
            branch
        ));
        git::assert_known_branch(self.runner, submodule_dir, branch)?;
        git::pull_origin(self.runner, submodule_dir, branch)?;
        git::head_sha(self.runner, submodule_dir)
    }

    fn commit_pointer(
        &self,
        repo_dir: &Path,
        name: &str,
        relative_path: &str,
        message: &str,
    ) -> Result<()> {
        git::add(self.runner, repo_dir, relative_path)?;
        prompt::confirm_or_abort(
            self.prompter,
            &self.options,
            &format!(
                "Commit '{}' in {} with message {:?}. {}",
                relative_path, name, message, CONTINUE_PROMPT
            ),
        )?;
        let output = git::commit(self.runner, repo_dir, message)?;
        self.verbose(output.trim_end().to_string());
        Ok(())
    }

    fn push_branch(&self, repo_dir: &Path, name: &str, branch: &str) -> Result<()> {
        prompt::confirm_or_abort(
            self.prompter,
            &self.options,
            &format!("Push {}'s branch '{}' to origin. {}", name, branch, CONTINUE_PROMPT),
        )?;
        self.verbose(format!(
            "Pushing repo [{}]'s branch '{}' to origin...",
            name, branch
        ));
        git::push_origin(self.runner, repo_dir, branch)
    }
}
