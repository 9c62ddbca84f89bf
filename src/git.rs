//! Git command wrappers.
//!
//! Thin wrappers around git CLI commands plus the parsers for the stdout
//! shapes they rely on. Every call names the repository directory it runs
//! in explicitly.

use crate::command::{CommandLine, CommandRunner};
use crate::constants::ORIGIN;
use crate::error::{Error, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// `-<sha> <path>`: the leading `-` marks an uninitialized submodule.
static SUBMODULE_STATUS_SHA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-([abcdef0-9]+) ").expect("valid submodule status regex"));

fn run_git(runner: &dyn CommandRunner, repo: &Path, args: &[&str]) -> Result<String> {
    runner.run(repo, &CommandLine::git(args))
}

fn validate_branch_name(branch: &str) -> Result<()> {
    if branch.contains('\0') || branch.contains('\n') || branch.is_empty() || branch.starts_with('-')
    {
        return Err(Error::InvalidBranchName(branch.to_string()));
    }
    Ok(())
}

/// Branch names from `git branch` output, with the `* ` marker and padding stripped.
pub fn parse_branch_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.trim_matches(|c| c == ' ' || c == '*'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Substring match: `feature/x` satisfies a request for `x`.
pub fn branch_is_known(branches: &[String], branch: &str) -> bool {
    branches.iter().any(|known| known.contains(branch))
}

/// First SHA flagged with a leading `-` in `git submodule status` output.
pub fn parse_submodule_sha(output: &str) -> Option<&str> {
    SUBMODULE_STATUS_SHA
        .captures(output)
        .and_then(|captures| captures.get(1))
        .map(|sha| sha.as_str())
}

pub fn clone(runner: &dyn CommandRunner, workdir: &Path, url: &str, target: &Path) -> Result<()> {
    let target = target.to_string_lossy();
    run_git(runner, workdir, &["clone", "--quiet", url, target.as_ref()])?;
    Ok(())
}

pub fn fetch(runner: &dyn CommandRunner, repo: &Path) -> Result<()> {
    run_git(runner, repo, &["fetch", "--quiet"])?;
    Ok(())
}

/// Fetches, then lists local and remote-tracking branches.
pub fn list_branches(runner: &dyn CommandRunner, repo: &Path) -> Result<Vec<String>> {
    fetch(runner, repo)?;
    let output = run_git(runner, repo, &["branch", "--all"])?;
    Ok(parse_branch_list(&output))
}

pub fn assert_known_branch(runner: &dyn CommandRunner, repo: &Path, branch: &str) -> Result<()> {
    let branches = list_branches(runner, repo)?;
    if branch_is_known(&branches, branch) {
        Ok(())
    } else {
        Err(Error::UnknownBranch {
            branch: branch.to_string(),
            known: branches,
        })
    }
}

pub fn get_current_branch(runner: &dyn CommandRunner, repo: &Path) -> Result<String> {
    run_git(runner, repo, &["rev-parse", "--abbrev-ref", "HEAD"]).map(|out| out.trim().to_string())
}

pub fn head_sha(runner: &dyn CommandRunner, repo: &Path) -> Result<String> {
    run_git(runner, repo, &["rev-parse", "HEAD"]).map(|out| out.trim().to_string())
}

pub fn checkout(runner: &dyn CommandRunner, repo: &Path, branch: &str) -> Result<()> {
    validate_branch_name(branch)?;
    run_git(runner, repo, &["checkout", "--quiet", branch])?;
    Ok(())
}

pub fn submodule_status(runner: &dyn CommandRunner, repo: &Path, path: &str) -> Result<String> {
    run_git(runner, repo, &["submodule", "status", path])
}

pub fn submodule_init(runner: &dyn CommandRunner, repo: &Path, path: &str) -> Result<()> {
    run_git(runner, repo, &["submodule", "update", "--init", "--quiet", path])?;
    Ok(())
}

pub fn pull_origin(runner: &dyn CommandRunner, repo: &Path, branch: &str) -> Result<()> {
    validate_branch_name(branch)?;
    run_git(runner, repo, &["pull", "--quiet", "--ff-only", ORIGIN, branch])?;
    Ok(())
}

pub fn add(runner: &dyn CommandRunner, repo: &Path, path: &str) -> Result<()> {
    run_git(runner, repo, &["add", path])?;
    Ok(())
}

pub fn commit(runner: &dyn CommandRunner, repo: &Path, message: &str) -> Result<String> {
    run_git(runner, repo, &["commit", "-m", message])
}

pub fn push_origin(runner: &dyn CommandRunner, repo: &Path, branch: &str) -> Result<()> {
    validate_branch_name(branch)?;
    run_git(runner, repo, &["push", "--quiet", ORIGIN, branch])?;
    Ok(())
}
