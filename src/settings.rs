//! Run configuration loaded from the YAML settings file.
//!
//! Loaded once at startup and passed by reference into the updater; nothing
//! mutates it afterwards.

use crate::constants::{DEFAULT_BUILD_DIR, DEFAULT_TARGET_BRANCH};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One downstream repository and the branch on it to update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoDescriptor {
    pub name: String,
    pub branch: String,
    /// Overrides `target_submodule_relative_path` for this repo only.
    #[serde(default)]
    pub submodule_path: Option<String>,
}

impl RepoDescriptor {
    pub fn new(name: &str, branch: &str) -> Self {
        Self {
            name: name.to_string(),
            branch: branch.to_string(),
            submodule_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Wiped and recreated on every run; all clones land here.
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
    /// Clone URL prefix, e.g. `git@github.com:octocat`.
    pub git_repo_base_clone_path: String,
    #[serde(default)]
    pub known_repos: Vec<RepoDescriptor>,
    pub target_submodule_name: String,
    pub target_submodule_relative_path: String,
    #[serde(default = "default_target_branch")]
    pub target_submodule_target_branch: String,
}

fn default_build_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BUILD_DIR)
}

fn default_target_branch() -> String {
    DEFAULT_TARGET_BRANCH.to_string()
}

/// True for `.` or `../remotes`; false for URLs, `host:path` and absolute paths.
/// Like git, a `:` only marks a remote host when no `/` comes before it.
fn is_relative_local_path(base: &str) -> bool {
    if base.contains("://") || Path::new(base).is_absolute() {
        return false;
    }
    match base.find(':') {
        Some(colon) => base[..colon].contains('/'),
        None => true,
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::Settings {
                path: path.to_path_buf(),
                message: "No settings file found".to_string(),
            });
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::io(path, "Failed to read settings file", e))?;
        Self::from_yaml(&contents).map_err(|message| Error::Settings {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn from_yaml(contents: &str) -> std::result::Result<Self, String> {
        let settings: Settings = serde_yaml::from_str(contents).map_err(|e| e.to_string())?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let required = [
            ("git_repo_base_clone_path", &self.git_repo_base_clone_path),
            ("target_submodule_name", &self.target_submodule_name),
            (
                "target_submodule_relative_path",
                &self.target_submodule_relative_path,
            ),
            (
                "target_submodule_target_branch",
                &self.target_submodule_target_branch,
            ),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(format!("'{}' must not be empty", key));
            }
        }
        for (index, repo) in self.known_repos.iter().enumerate() {
            if repo.name.trim().is_empty() || repo.branch.trim().is_empty() {
                return Err(format!(
                    "known_repos[{}] needs both a name and a branch",
                    index
                ));
            }
        }
        Ok(())
    }

    /// Anchors a relative `build_dir`, and a base clone path that is a
    /// relative local path, at the current directory. Clones run inside the
    /// build dir and must not resolve either one against it.
    pub fn with_absolute_paths(mut self) -> Result<Self> {
        self.build_dir = std::path::absolute(&self.build_dir)
            .map_err(|e| Error::io(&self.build_dir, "Failed to resolve build dir", e))?;
        if is_relative_local_path(&self.git_repo_base_clone_path) {
            let base = Path::new(&self.git_repo_base_clone_path);
            let absolute = std::path::absolute(base)
                .map_err(|e| Error::io(base, "Failed to resolve base clone path", e))?;
            self.git_repo_base_clone_path = absolute.to_string_lossy().into_owned();
        }
        Ok(self)
    }

    pub fn clone_url(&self, repo_name: &str) -> String {
        format!("{}/{}.git", self.git_repo_base_clone_path, repo_name)
    }

    pub fn repo_dir(&self, repo_name: &str) -> PathBuf {
        self.build_dir.join(repo_name)
    }

    /// Relative path of the target submodule inside `repo`.
    pub fn submodule_path_for<'a>(&'a self, repo: &'a RepoDescriptor) -> &'a str {
        repo.submodule_path
            .as_deref()
            .unwrap_or(&self.target_submodule_relative_path)
    }
}
