use clap::Parser;
use submodule_update::cli::Cli;
use submodule_update::command::SystemRunner;
use submodule_update::config::RunOptions;
use submodule_update::constants::{self, EXIT_ABORTED, EXIT_FAILURE};
use submodule_update::error::Error;
use submodule_update::menu;
use submodule_update::output::{self, ConsoleCallbacks};
use submodule_update::prompt::{Prompter, TerminalPrompter};
use submodule_update::repo::Updater;
use submodule_update::settings::Settings;

fn main() {
    let options = Cli::parse().options();

    if let Err(e) = run(options) {
        let aborted = e
            .downcast_ref::<Error>()
            .is_some_and(Error::is_user_abort);
        output::print_error(&e.to_string(), aborted);
        std::process::exit(if aborted { EXIT_ABORTED } else { EXIT_FAILURE });
    }
}

fn run(options: RunOptions) -> anyhow::Result<()> {
    let settings = Settings::load(&constants::settings_path())?.with_absolute_paths()?;
    let prompter = TerminalPrompter::new();

    output::print_menu(&menu::build_menu(&settings.known_repos));
    let input = prompter.read_line(menu::SELECTION_PROMPT)?;
    let selection = menu::resolve_selection(&menu::parse_selection(&input), &settings.known_repos);
    output::print_selection(&selection, &options);

    if selection.is_empty() {
        output::print_nothing_selected(&options);
        return Ok(());
    }

    let runner = SystemRunner::new(options.command_logger());
    let callbacks = ConsoleCallbacks::new(options);
    let updater = Updater::new(&settings, options, &runner, &prompter, &callbacks);
    let summary = updater.process_repos(&selection.repos)?;
    drop(callbacks);

    output::print_summary(&summary);
    Ok(())
}
