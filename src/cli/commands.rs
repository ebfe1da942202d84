use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::{debug, instrument};

use crate::application::{ApplicationResult, EditorController, IgnoreReason, SelectionOutcome};
use crate::cli::args::{Cli, Commands, ConfigCommands, OutputFormat};
use crate::cli::output;
use crate::cli::script::{parse_line, ModeSwitch, ScriptCommand};
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{NodeId, Snapshot, TreeNodeConvert};

/// Counts of script commands that changed state or were turned away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptReport {
    pub applied: usize,
    pub rejected: usize,
}

/// What a single script command did to the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Applied,
    SourceSelected(NodeId),
    Ignored(IgnoreReason),
    /// Read-only request for the current tree
    Show,
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Run {
            script,
            format,
            echo,
        }) => {
            let settings = Settings::load(cli.config.as_deref())?;
            _run(&settings, script.as_deref(), *format, *echo)
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => {
                let settings = Settings::load(cli.config.as_deref())?;
                output::info(&settings.to_toml()?);
                Ok(())
            }
            ConfigCommands::Path => {
                match global_config_path() {
                    Some(path) => output::info(&path.display()),
                    None => output::warning("no config directory available on this platform"),
                }
                Ok(())
            }
        },
        None => Ok(()),
    }
}

#[instrument(skip(settings))]
fn _run(
    settings: &Settings,
    script: Option<&Path>,
    format: OutputFormat,
    echo: bool,
) -> CliResult<()> {
    let mut controller = EditorController::from_settings(settings);
    let report = match script {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| CliError::io(format!("open {}", path.display()), e))?;
            run_script(&mut controller, BufReader::new(file), echo)?
        }
        None => run_script(&mut controller, io::stdin().lock(), echo)?,
    };
    debug!("script finished: {:?}", report);

    output::info(&render(&controller.snapshot(), format)?);
    if report.rejected > 0 {
        output::warning(&format!("{} command(s) rejected", report.rejected));
    }
    Ok(())
}

/// Feeds every line of `reader` to `controller`.
///
/// Rejected commands are reported and skipped; malformed lines abort with
/// [`CliError::Script`].
pub fn run_script<R: BufRead>(
    controller: &mut EditorController,
    reader: R,
    echo: bool,
) -> CliResult<ScriptReport> {
    let mut report = ScriptReport::default();
    for (number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| CliError::io("read script", e))?;
        let command = parse_line(&line).map_err(|message| CliError::Script {
            line: number + 1,
            message,
        })?;
        let Some(command) = command else {
            continue;
        };

        match apply(controller, &command) {
            Ok(CommandOutcome::Show) => output::info(&controller.snapshot().to_tree_string()),
            Ok(outcome @ (CommandOutcome::Applied | CommandOutcome::SourceSelected(_))) => {
                report.applied += 1;
                if let CommandOutcome::SourceSelected(source) = outcome {
                    output::action("Selected", &format!("node {} to relink", source));
                }
                if echo {
                    output::header(&format!("> {}", line.trim()));
                    output::info(&controller.snapshot().to_tree_string());
                }
            }
            Ok(CommandOutcome::Ignored(reason)) => {
                report.rejected += 1;
                output::warning(&format!("line {}: {}: {}", number + 1, line.trim(), reason));
            }
            Err(e) => {
                report.rejected += 1;
                output::warning(&format!("line {}: {}", number + 1, e));
            }
        }
    }
    Ok(report)
}

/// Runs one command against `controller` without printing anything.
pub fn apply(
    controller: &mut EditorController,
    command: &ScriptCommand,
) -> ApplicationResult<CommandOutcome> {
    let applied = |_| CommandOutcome::Applied;
    match command {
        ScriptCommand::Add { parent, label } => match label {
            Some(label) => controller.add_child_labeled(*parent, label).map(applied),
            None => controller.add_child(*parent).map(applied),
        },
        ScriptCommand::Delete(node) => controller.delete_subtree(*node).map(applied),
        ScriptCommand::Relink { node, new_parent } => {
            controller.relink(*node, *new_parent).map(applied)
        }
        ScriptCommand::Rename { node, label } => controller.rename(*node, label).map(applied),
        ScriptCommand::Retype { node, category } => {
            controller.retype(*node, *category).map(applied)
        }
        ScriptCommand::Measure { node, width } => {
            controller.set_measured_width(*node, *width).map(applied)
        }
        ScriptCommand::RelinkMode(ModeSwitch::On) => {
            controller.enter_relink_mode()?;
            Ok(CommandOutcome::Applied)
        }
        ScriptCommand::RelinkMode(ModeSwitch::Off) => {
            controller.exit_relink_mode();
            Ok(CommandOutcome::Applied)
        }
        ScriptCommand::RelinkMode(ModeSwitch::Toggle) => {
            controller.toggle_relink_mode()?;
            Ok(CommandOutcome::Applied)
        }
        ScriptCommand::Select(node) => Ok(match controller.select_for_relink(*node) {
            SelectionOutcome::SourceSelected(source) => CommandOutcome::SourceSelected(source),
            SelectionOutcome::Relinked(_) => CommandOutcome::Applied,
            SelectionOutcome::Ignored(reason) => {
                debug!("select {} ignored: {:?}", node, reason);
                CommandOutcome::Ignored(reason)
            }
        }),
        ScriptCommand::Cancel => {
            controller.cancel_relink_selection();
            Ok(CommandOutcome::Applied)
        }
        ScriptCommand::Show => Ok(CommandOutcome::Show),
    }
}

/// Final snapshot in the requested format.
pub fn render(snapshot: &Snapshot, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Tree => Ok(snapshot.to_tree_string().to_string()),
        OutputFormat::Toml => {
            toml::to_string_pretty(snapshot).map_err(|e| CliError::Output(e.to_string()))
        }
    }
}
