//! Colored console output, progress spinner, and summary formatting.

use crate::config::RunOptions;
use crate::constants::PROGRESS_TICK_MS;
use crate::error::Error;
use crate::menu::Selection;
use crate::repo::{RepoOutcome, RepoResult, RunSummary, UpdateCallbacks, UpdateStep};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Normal,
    Warn,
    Error,
    Success,
    /// Only shown with `-v`.
    Verbose,
}

pub fn format_message(level: MessageLevel, message: &str) -> String {
    match level {
        MessageLevel::Normal => message.to_string(),
        MessageLevel::Warn => message.yellow().to_string(),
        MessageLevel::Error => message.red().to_string(),
        MessageLevel::Success => message.green().to_string(),
        MessageLevel::Verbose => message.cyan().to_string(),
    }
}

pub fn print_message(options: &RunOptions, level: MessageLevel, message: &str) {
    match level {
        MessageLevel::Verbose if !options.is_verbose() => {}
        MessageLevel::Error => eprintln!("{}", format_message(level, message)),
        _ => println!("{}", format_message(level, message)),
    }
}

/// No-op callbacks for when progress tracking is not needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOpCallbacks;

impl UpdateCallbacks for NoOpCallbacks {
    fn on_step(&self, _repo: &str, _step: UpdateStep) {}
}

/// Console callbacks: colored messages, verbose step lines, and a spinner
/// per repo when nothing else writes to the terminal.
pub struct ConsoleCallbacks {
    options: RunOptions,
    spinner: RefCell<Option<ProgressBar>>,
}

impl ConsoleCallbacks {
    pub fn new(options: RunOptions) -> Self {
        Self {
            options,
            spinner: RefCell::new(None),
        }
    }

    fn start_spinner(&self, repo: &str) {
        if !self.options.shows_spinner() {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {prefix:.bold} {msg}")
        {
            spinner.set_style(style);
        }
        self.finish_spinner(None);
        // Hidden bars swallow println, so fall back to plain output.
        if spinner.is_hidden() {
            return;
        }
        spinner.set_prefix(repo.to_string());
        spinner.enable_steady_tick(Duration::from_millis(PROGRESS_TICK_MS));
        *self.spinner.borrow_mut() = Some(spinner);
    }

    fn finish_spinner(&self, message: Option<String>) {
        if let Some(spinner) = self.spinner.borrow_mut().take() {
            match message {
                Some(message) => spinner.finish_with_message(message),
                None => spinner.finish_and_clear(),
            }
        }
    }
}

impl UpdateCallbacks for ConsoleCallbacks {
    fn on_repo_start(&self, repo: &str) {
        if self.options.is_verbose() {
            eprintln!("\n{}", format!("[{}]", repo).white().bold());
        }
        self.start_spinner(repo);
    }

    fn on_step(&self, _repo: &str, step: UpdateStep) {
        if self.options.is_verbose() {
            eprintln!("  {}...", step.to_string().dimmed());
        }
        if let Some(spinner) = self.spinner.borrow().as_ref() {
            spinner.set_message(format_step_message(step));
        }
    }

    fn on_message(&self, level: MessageLevel, message: &str) {
        if level == MessageLevel::Verbose && !self.options.is_verbose() {
            return;
        }
        match self.spinner.borrow().as_ref() {
            Some(spinner) => spinner.println(format_message(level, message)),
            None => print_message(&self.options, level, message),
        }
    }

    fn on_repo_complete(&self, result: &RepoResult) {
        let line = match &result.outcome {
            RepoOutcome::Updated { submodule_sha } => format!(
                "{} {} updated to {}",
                "✓".green(),
                result.repo.name,
                short_sha(submodule_sha)
            ),
            RepoOutcome::UpToDate => format!(
                "{} {} already up to date",
                "-".yellow(),
                result.repo.name
            ),
        };
        if self.spinner.borrow().is_some() {
            self.finish_spinner(Some(line));
        } else {
            println!("{}", line);
        }
    }

    fn on_repo_failed(&self, repo: &str, _error: &Error) {
        self.finish_spinner(Some(format!("{} {} failed", "✗".red(), repo)));
    }
}

impl Drop for ConsoleCallbacks {
    fn drop(&mut self) {
        self.finish_spinner(None);
    }
}

fn format_step_message(step: UpdateStep) -> &'static str {
    match step {
        UpdateStep::ResolvingTarget => "Resolving target branch HEAD...",
        UpdateStep::Cloning => "Cloning...",
        UpdateStep::CheckingOut => "Checking out branch...",
        UpdateStep::CheckingSubmodule => "Checking submodule status...",
        UpdateStep::InitializingSubmodule => "Initializing submodule...",
        UpdateStep::PullingSubmodule => "Pulling submodule to latest...",
        UpdateStep::Committing => "Committing submodule pointer...",
        UpdateStep::Pushing => "Pushing to origin...",
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

fn format_duration(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f32())
}

pub fn print_menu(menu: &str) {
    println!("{}", menu);
}

pub fn print_selection(selection: &Selection, options: &RunOptions) {
    for ignored in &selection.ignored {
        print_message(
            options,
            MessageLevel::Warn,
            &format!("Unknown index: {}. Ignoring it", ignored),
        );
    }
    if selection.all {
        print_message(options, MessageLevel::Warn, "Selected ALL");
    } else {
        for repo in &selection.repos {
            print_message(
                options,
                MessageLevel::Normal,
                &format!("The Repo is: {}", repo.name),
            );
        }
    }
}

pub fn print_nothing_selected(options: &RunOptions) {
    print_message(
        options,
        MessageLevel::Warn,
        "No valid repo indexes found, nothing to process",
    );
}

pub fn print_summary(summary: &RunSummary) {
    print_section("Summary");
    println!(
        "{} {}",
        "Target sha:".cyan(),
        summary.target_sha.white().bold()
    );

    let updated: Vec<_> = summary.updated().collect();
    if !updated.is_empty() {
        println!("{}", format!("Updated ({}):", updated.len()).green().bold());
        for result in &updated {
            if let RepoOutcome::Updated { submodule_sha } = &result.outcome {
                println!(
                    "  {} {} ({}) -> {} in {}",
                    "OK".green().bold(),
                    result.repo.name.white(),
                    result.repo.branch.cyan(),
                    short_sha(submodule_sha),
                    format_duration(result.duration).dimmed(),
                );
            }
        }
        println!();
    }

    let current: Vec<_> = summary.up_to_date().collect();
    if !current.is_empty() {
        println!(
            "{}",
            format!("Already current ({}):", current.len()).yellow().bold()
        );
        for result in &current {
            println!(
                "  {} {} ({})",
                "SKIP".yellow().bold(),
                result.repo.name.white(),
                result.repo.branch.cyan(),
            );
        }
        println!();
    }

    println!(
        "{}: {}/{} repos updated in {}",
        "Total".white().bold(),
        updated.len(),
        summary.results.len(),
        format_duration(summary.duration)
    );
}

pub fn print_error(message: &str, aborted: bool) {
    eprintln!("{}", message.red());
    if aborted {
        eprintln!("{}", "Exiting...".yellow());
    } else {
        eprintln!("{}", "Exiting...".red());
    }
}

fn print_section(title: &str) {
    let line = "=".repeat(50).cyan().dimmed();
    let padding = (50 - title.len()) / 2;
    let centered = format!("{:>width$}", title, width = padding + title.len());
    println!("\n{}\n{}\n{}\n", line, centered.cyan().bold(), line);
}
