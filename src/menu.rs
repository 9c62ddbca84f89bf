//! Repo selection menu.
//!
//! Menu index 1 is "ALL"; the configured repos follow from index 2 in
//! configured order.

use crate::constants::{MENU_ALL_INDEX, MENU_INDEX_OFFSET};
use crate::settings::RepoDescriptor;
use regex::Regex;
use std::sync::LazyLock;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid digit regex"));

/// Repo-list index meaning "every configured repo".
pub const ALL: i64 = -1;

pub const SELECTION_PROMPT: &str =
    "Select the Repos to update (space|comma delimited list. i.e. 2 3 7 OR 2, 3, 7)";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub repos: Vec<RepoDescriptor>,
    /// Menu indices that matched nothing, as the user typed them.
    pub ignored: Vec<i64>,
    pub all: bool,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }
}

pub fn build_menu(repos: &[RepoDescriptor]) -> String {
    let mut menu = format!("  {}) ALL\n", MENU_ALL_INDEX);
    for (index, repo) in repos.iter().enumerate() {
        menu.push_str(&format!(
            "  {}) {} ({})\n",
            index + MENU_INDEX_OFFSET as usize,
            repo.name,
            repo.branch
        ));
    }
    menu
}

/// Every digit run in `input`, shifted from menu index to repo-list index.
/// `ALL` (-1) stands for menu entry 1; anything that is not digits is dropped.
pub fn parse_selection(input: &str) -> Vec<i64> {
    DIGIT_RUN
        .find_iter(input)
        .filter_map(|token| token.as_str().parse::<i64>().ok())
        .map(|menu_index| menu_index - MENU_INDEX_OFFSET)
        .collect()
}

/// Maps repo-list indices to descriptors.
///
/// `ALL` anywhere wins and yields the full configured list. Out-of-range
/// indices are collected in `ignored`. Repeated indices are kept.
pub fn resolve_selection(indices: &[i64], repos: &[RepoDescriptor]) -> Selection {
    if indices.contains(&ALL) {
        return Selection {
            repos: repos.to_vec(),
            ignored: Vec::new(),
            all: true,
        };
    }

    let mut selection = Selection::default();
    for &index in indices {
        match usize::try_from(index).ok().and_then(|i| repos.get(i)) {
            Some(repo) => selection.repos.push(repo.clone()),
            None => selection.ignored.push(index + MENU_INDEX_OFFSET),
        }
    }
    selection
}
