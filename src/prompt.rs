//! Interactive input.

use crate::config::RunOptions;
use crate::error::{Error, Result};
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use std::io::{BufRead, IsTerminal, Write};

pub const CONTINUE_PROMPT: &str = "Continue? [y/N]";

/// Reads one line of free-form input.
pub trait Prompter {
    fn read_line(&self, prompt: &str) -> Result<String>;
}

/// Reads from the terminal, or plain lines from stdin when it is piped.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn read_line(&self, prompt: &str) -> Result<String> {
        if !std::io::stdin().is_terminal() {
            return read_piped_line(prompt);
        }
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::Prompt(e.to_string()))
    }
}

fn read_piped_line(prompt: &str) -> Result<String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{}: ", prompt)
        .and_then(|_| stdout.flush())
        .map_err(|e| Error::Prompt(e.to_string()))?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| Error::Prompt(e.to_string()))?;
    println!();
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Proceeds only on a case-insensitive `y`; anything else aborts the run.
/// A no-op unless prompting is enabled.
pub fn confirm_or_abort(prompter: &dyn Prompter, options: &RunOptions, prompt: &str) -> Result<()> {
    if !options.prompts_before_changes() {
        return Ok(());
    }
    let answer = prompter.read_line(prompt)?;
    if answer.trim().eq_ignore_ascii_case("y") {
        Ok(())
    } else {
        Err(Error::UserAbort)
    }
}
