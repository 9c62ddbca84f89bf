//! Application-wide constants.
//!
//! Centralized configuration values to avoid magic numbers throughout the codebase.

use std::path::PathBuf;

/// Settings file looked up in the current directory when no override is set.
pub const DEFAULT_SETTINGS_FILE: &str = "settings.yml";

/// Environment variable overriding the settings file location.
pub const SETTINGS_ENV_VAR: &str = "SUBMODULE_UPDATE_SETTINGS";

/// Build directory (relative to the current directory) used when the settings omit one.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Branch of the target submodule used when the settings omit one.
pub const DEFAULT_TARGET_BRANCH: &str = "master";

/// Remote every clone pulls from and pushes to.
pub const ORIGIN: &str = "origin";

/// Menu index of the synthetic "ALL" entry.
pub const MENU_ALL_INDEX: usize = 1;

/// Offset between a menu index and a zero-based repo index.
/// Menu index 1 is "ALL", so the first repo sits at menu index 2.
pub const MENU_INDEX_OFFSET: i64 = 2;

/// Progress spinner tick interval in milliseconds.
pub const PROGRESS_TICK_MS: u64 = 80;

/// Process exit code for fatal errors.
pub const EXIT_FAILURE: i32 = 1;

/// Process exit code when the user declines a confirmation prompt.
pub const EXIT_ABORTED: i32 = 3;

/// Returns the settings file path.
///
/// Can be customized via the SUBMODULE_UPDATE_SETTINGS environment variable.
/// Falls back to `settings.yml` in the current directory.
///
/// Example: `SUBMODULE_UPDATE_SETTINGS=~/vendor.yml submodule-update -v`
pub fn settings_path() -> PathBuf {
    std::env::var_os(SETTINGS_ENV_VAR)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
}
