//! Test infrastructure for submodule-update integration tests.
#![allow(dead_code)]

use anyhow::{Result, bail};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use submodule_update::command::{CommandLine, CommandRunner};
use submodule_update::error::{self, Error};
use submodule_update::output::MessageLevel;
use submodule_update::prompt::Prompter;
use submodule_update::repo::{RepoResult, UpdateCallbacks, UpdateStep};
use submodule_update::settings::{RepoDescriptor, Settings};
use tempfile::TempDir;

pub const TARGET: &str = "saccharin";
pub const SUBMODULE_PATH: &str = "vendor/saccharin";
pub const TARGET_SHA: &str = "bd5fb0ce3d9646d9afd3cb4007b87d0cf1811a03";
pub const STALE_SHA: &str = "0123456789abcdef0123456789abcdef01234567";

/// Settings for a fake run rooted in `build_dir`.
pub fn settings(build_dir: &Path, repos: &[(&str, &str)]) -> Settings {
    Settings {
        build_dir: build_dir.to_path_buf(),
        git_repo_base_clone_path: "git@example.com:octocat".to_string(),
        known_repos: repos
            .iter()
            .map(|(name, branch)| RepoDescriptor::new(name, branch))
            .collect(),
        target_submodule_name: TARGET.to_string(),
        target_submodule_relative_path: SUBMODULE_PATH.to_string(),
        target_submodule_target_branch: "master".to_string(),
    }
}

struct Rule {
    dir: String,
    prefix: String,
    response: std::result::Result<String, String>,
}

/// A `CommandRunner` that answers from a script instead of running git.
///
/// Directories are named relative to the build dir (`""` for the build dir
/// itself, `"alpha"`, `"alpha/vendor/saccharin"`). Each call is recorded as
/// `"<dir>: <command>"`. A `git clone` creates its target directory plus the
/// configured submodule directories inside it, and like git refuses a
/// target that is not empty. Later rules override earlier
/// ones; unscripted commands print nothing.
pub struct ScriptedRunner {
    root: PathBuf,
    rules: Vec<Rule>,
    clone_creates: Vec<String>,
    simulate_clone: bool,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            rules: Vec::new(),
            clone_creates: vec![SUBMODULE_PATH.to_string()],
            simulate_clone: true,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Answers `git <prefix>...` run in `dir` with `stdout`.
    pub fn on(mut self, dir: &str, prefix: &str, stdout: &str) -> Self {
        self.rules.push(Rule {
            dir: dir.to_string(),
            prefix: prefix.to_string(),
            response: Ok(stdout.to_string()),
        });
        self
    }

    /// Fails `git <prefix>...` run in `dir`.
    pub fn fail(mut self, dir: &str, prefix: &str, message: &str) -> Self {
        self.rules.push(Rule {
            dir: dir.to_string(),
            prefix: prefix.to_string(),
            response: Err(message.to_string()),
        });
        self
    }

    pub fn clone_creates(mut self, dirs: &[&str]) -> Self {
        self.clone_creates = dirs.iter().map(|d| d.to_string()).collect();
        self
    }

    /// Clones succeed without creating anything on disk.
    pub fn without_clone_dirs(mut self) -> Self {
        self.simulate_clone = false;
        self
    }

    /// Target repo on `master` at `TARGET_SHA`; `repos` are `(name, branch, submodule sha)`,
    /// each already on its branch.
    pub fn standard(root: &Path, repos: &[(&str, &str, &str)]) -> Self {
        let mut runner = Self::new(root)
            .on(TARGET, "branch", "* master\n  remotes/origin/HEAD -> origin/master\n  remotes/origin/master\n")
            .on(TARGET, "rev-parse --abbrev-ref HEAD", "master\n")
            .on(TARGET, "rev-parse HEAD", &format!("{}\n", TARGET_SHA));
        for (name, branch, sha) in repos {
            let submodule_dir = format!("{}/{}", name, SUBMODULE_PATH);
            runner = runner
                .on(name, "branch", &format!("* {}\n  remotes/origin/{}\n", branch, branch))
                .on(name, "rev-parse --abbrev-ref HEAD", &format!("{}\n", branch))
                .on(name, "rev-parse HEAD", "1111111111111111111111111111111111111111\n")
                .on(name, "submodule status", &format!("-{} {}\n", sha, SUBMODULE_PATH))
                .on(name, "commit", &format!("[{} abc1234] bump\n 1 file changed\n", branch))
                .on(&submodule_dir, "branch", "* (HEAD detached at 0123456)\n  remotes/origin/master\n")
                .on(&submodule_dir, "rev-parse HEAD", &format!("{}\n", TARGET_SHA));
        }
        runner
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Recorded calls made in `dir`, without the dir prefix.
    pub fn calls_in(&self, dir: &str) -> Vec<String> {
        let prefix = format!("{}: ", dir);
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| call.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }

    pub fn ran(&self, dir: &str, command: &str) -> bool {
        self.calls_in(dir).iter().any(|call| call.starts_with(command))
    }

    fn key(&self, dir: &Path) -> String {
        dir.strip_prefix(&self.root)
            .map(|rel| rel.to_string_lossy().into_owned())
            .unwrap_or_else(|_| dir.to_string_lossy().into_owned())
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, dir: &Path, command: &CommandLine) -> error::Result<String> {
        let key = self.key(dir);
        let args = command.args().join(" ");
        self.calls
            .borrow_mut()
            .push(format!("{}: {}", key, command));

        if command.args().first().map(String::as_str) == Some("clone") {
            if let Some(target) = command.args().last() {
                let target = PathBuf::from(target);
                let occupied = std::fs::read_dir(&target)
                    .map(|mut entries| entries.next().is_some())
                    .unwrap_or(false);
                if occupied {
                    return Err(Error::Execution {
                        command: command.to_string(),
                        message: format!(
                            "returned error[fatal: destination path '{}' already exists and is not an empty directory.]",
                            target.display()
                        ),
                    });
                }
            }
        }

        if self.simulate_clone && command.args().first().map(String::as_str) == Some("clone") {
            if let Some(target) = command.args().last() {
                let target = PathBuf::from(target);
                for sub in &self.clone_creates {
                    std::fs::create_dir_all(target.join(sub)).map_err(|e| Error::Execution {
                        command: command.to_string(),
                        message: e.to_string(),
                    })?;
                }
                std::fs::create_dir_all(&target).map_err(|e| Error::Execution {
                    command: command.to_string(),
                    message: e.to_string(),
                })?;
            }
        }

        let rule = self
            .rules
            .iter()
            .rev()
            .find(|rule| rule.dir == key && args.starts_with(&rule.prefix));
        match rule.map(|r| &r.response) {
            Some(Ok(stdout)) => Ok(stdout.clone()),
            Some(Err(message)) => Err(Error::Execution {
                command: command.to_string(),
                message: message.clone(),
            }),
            None => Ok(String::new()),
        }
    }
}

/// A `Prompter` that replays canned answers and records every prompt.
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<String>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().map(|a| a.to_string()).collect()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&self, prompt: &str) -> error::Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Error::Prompt(format!("no scripted answer for {:?}", prompt)))
    }
}

/// Records callback events as plain strings.
#[derive(Default)]
pub struct RecordingCallbacks {
    events: RefCell<Vec<String>>,
}

impl RecordingCallbacks {
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn messages(&self, level: MessageLevel) -> Vec<String> {
        let prefix = format!("message {:?}: ", level);
        self.events
            .borrow()
            .iter()
            .filter_map(|e| e.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }
}

impl UpdateCallbacks for RecordingCallbacks {
    fn on_repo_start(&self, repo: &str) {
        self.events.borrow_mut().push(format!("start {}", repo));
    }

    fn on_step(&self, repo: &str, step: UpdateStep) {
        self.events.borrow_mut().push(format!("{} {}", repo, step));
    }

    fn on_message(&self, level: MessageLevel, message: &str) {
        self.events
            .borrow_mut()
            .push(format!("message {:?}: {}", level, message));
    }

    fn on_repo_complete(&self, result: &RepoResult) {
        self.events
            .borrow_mut()
            .push(format!("complete {}", result.repo.name));
    }

    fn on_repo_failed(&self, repo: &str, _error: &Error) {
        self.events.borrow_mut().push(format!("failed {}", repo));
    }
}

/// Environment that makes real git usable in a sandbox: identity, local
/// file transport for submodules, and no user or system config.
pub fn git_env(home: &Path) -> Vec<(String, String)> {
    vec![
        ("HOME".to_string(), home.to_string_lossy().into_owned()),
        ("XDG_CONFIG_HOME".to_string(), home.to_string_lossy().into_owned()),
        ("GIT_CONFIG_NOSYSTEM".to_string(), "1".to_string()),
        ("GIT_TERMINAL_PROMPT".to_string(), "0".to_string()),
        ("GIT_CONFIG_COUNT".to_string(), "4".to_string()),
        ("GIT_CONFIG_KEY_0".to_string(), "protocol.file.allow".to_string()),
        ("GIT_CONFIG_VALUE_0".to_string(), "always".to_string()),
        ("GIT_CONFIG_KEY_1".to_string(), "user.name".to_string()),
        ("GIT_CONFIG_VALUE_1".to_string(), "Test User".to_string()),
        ("GIT_CONFIG_KEY_2".to_string(), "user.email".to_string()),
        ("GIT_CONFIG_VALUE_2".to_string(), "test@example.com".to_string()),
        ("GIT_CONFIG_KEY_3".to_string(), "init.defaultBranch".to_string()),
        ("GIT_CONFIG_VALUE_3".to_string(), "master".to_string()),
    ]
}

/// Bare remotes for a target submodule repo and its consumers, all under
/// one base directory, plus a scratch area for building them.
pub struct Remotes {
    base: TempDir,
    scratch: TempDir,
    home: TempDir,
}

impl Remotes {
    pub fn new() -> Result<Self> {
        Ok(Self {
            base: TempDir::new()?,
            scratch: TempDir::new()?,
            home: TempDir::new()?,
        })
    }

    pub fn base(&self) -> &Path {
        self.base.path()
    }

    pub fn env(&self) -> Vec<(String, String)> {
        git_env(self.home.path())
    }

    pub fn git(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let output: Output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .envs(self.env())
            .output()?;
        if !output.status.success() {
            bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub fn bare_path(&self, name: &str) -> PathBuf {
        self.base.path().join(format!("{}.git", name))
    }

    fn work_path(&self, name: &str) -> PathBuf {
        self.scratch.path().join(name)
    }

    /// Creates `{name}.git` with one commit on `master`; returns the commit sha.
    pub fn create_target(&self, name: &str) -> Result<String> {
        let bare = self.bare_path(name);
        self.git(self.base.path(), &["init", "--bare", "-b", "master", &path_str(&bare)])?;
        let work = self.work_path(name);
        self.git(self.scratch.path(), &["clone", &path_str(&bare), &path_str(&work)])?;
        std::fs::write(work.join("lib.txt"), "v1\n")?;
        self.git(&work, &["add", "lib.txt"])?;
        self.git(&work, &["commit", "-m", "v1"])?;
        self.git(&work, &["push", "origin", "master"])?;
        self.git(&work, &["rev-parse", "HEAD"])
    }

    /// Pushes a new commit to the target's `master`; returns the new sha.
    pub fn advance_target(&self, name: &str, contents: &str) -> Result<String> {
        let work = self.work_path(name);
        std::fs::write(work.join("lib.txt"), contents)?;
        self.git(&work, &["commit", "-am", contents.trim()])?;
        self.git(&work, &["push", "origin", "master"])?;
        self.git(&work, &["rev-parse", "HEAD"])
    }

    /// Creates `{name}.git` whose `branch` embeds `target` at `submodule_path`,
    /// pinned to whatever the target's `master` currently is.
    pub fn create_consumer(
        &self,
        name: &str,
        branch: &str,
        target: &str,
        submodule_path: &str,
    ) -> Result<()> {
        let bare = self.bare_path(name);
        self.git(self.base.path(), &["init", "--bare", "-b", "master", &path_str(&bare)])?;
        let work = self.work_path(name);
        std::fs::create_dir_all(&work)?;
        self.git(&work, &["init", "-b", "master"])?;
        std::fs::write(work.join("README.md"), format!("# {}\n", name))?;
        self.git(&work, &["add", "README.md"])?;
        self.git(&work, &["commit", "-m", "Initial commit"])?;
        if branch != "master" {
            self.git(&work, &["checkout", "-b", branch])?;
        }
        self.git(
            &work,
            &["submodule", "add", &path_str(&self.bare_path(target)), submodule_path],
        )?;
        self.git(&work, &["commit", "-m", "Add submodule"])?;
        self.git(&work, &["remote", "add", "origin", &path_str(&bare)])?;
        self.git(&work, &["push", "origin", "--all"])?;
        Ok(())
    }

    /// Submodule pointer recorded on `branch` of `{name}.git`.
    pub fn pointer(&self, name: &str, branch: &str, submodule_path: &str) -> Result<String> {
        let bare = self.bare_path(name);
        self.git(
            self.base.path(),
            &[
                "--git-dir",
                &path_str(&bare),
                "rev-parse",
                &format!("{}:{}", branch, submodule_path),
            ],
        )
    }

    pub fn commit_count(&self, name: &str, branch: &str) -> Result<usize> {
        let bare = self.bare_path(name);
        let count = self.git(
            self.base.path(),
            &["--git-dir", &path_str(&bare), "rev-list", "--count", branch],
        )?;
        Ok(count.parse()?)
    }

    pub fn head_message(&self, name: &str, branch: &str) -> Result<String> {
        let bare = self.bare_path(name);
        self.git(
            self.base.path(),
            &["--git-dir", &path_str(&bare), "log", "-1", "--format=%s", branch],
        )
    }
}

pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
