use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::render::export_flat;
use crate::application::script::{execute, run_script};
use crate::application::{Command, Outcome, Session, TreeRender};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{expand_path, global_config_path, Settings};
use crate::domain::Tree;

const PROMPT: &str = "dirtree>";

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let config_path = cli
        .config
        .as_deref()
        .map(|p| expand_path(&p.to_string_lossy()));
    let config_path = config_path.as_deref();

    match &cli.command {
        Some(Commands::Show { flat }) => _show(config_path, *flat),
        Some(Commands::Run {
            script,
            empty,
            flat,
        }) => _run(config_path, &expand_path(&script.to_string_lossy()), *empty, *flat),
        Some(Commands::Repl { empty }) => _repl(config_path, *empty),
        Some(Commands::Config { command }) => _config(config_path, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::InvalidArgs(
            "no command given, see --help".to_string(),
        )),
    }
}

fn new_session(config_path: Option<&Path>, empty: bool) -> CliResult<Session> {
    let settings = Settings::load(config_path)?;
    debug!(?settings, "settings loaded");
    if empty {
        Ok(Session::new(Tree::with_policy(settings.parent_policy)))
    } else {
        Ok(Session::from_settings(&settings))
    }
}

fn print_tree(session: &Session, flat: bool) -> CliResult<()> {
    output::info(&session.to_tree_string());
    if flat {
        output::info(&export_flat(session.tree().get_flat())?);
    }
    Ok(())
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Tree(_) | Outcome::Flat(_) | Outcome::Help => output::info(outcome),
        _ => output::success(outcome),
    }
}

#[instrument]
fn _show(config_path: Option<&Path>, flat: bool) -> CliResult<()> {
    let session = new_session(config_path, false)?;
    print_tree(&session, flat)
}

#[instrument]
fn _run(config_path: Option<&Path>, script: &Path, empty: bool, flat: bool) -> CliResult<()> {
    let text = fs::read_to_string(script)
        .map_err(|e| CliError::io(format!("read {}", script.display()), e))?;
    let mut session = new_session(config_path, empty)?;

    let outcomes = run_script(&mut session, &text)?;
    debug!(count = outcomes.len(), "script finished");
    for outcome in &outcomes {
        print_outcome(outcome);
    }
    print_tree(&session, flat)
}

/// Reads commands until EOF. Failed commands are reported and the loop goes on.
#[instrument]
fn _repl(config_path: Option<&Path>, empty: bool) -> CliResult<()> {
    let mut session = new_session(config_path, empty)?;
    print_tree(&session, false)?;
    repl_loop(&mut session, io::stdin().lock())
}

fn repl_loop(session: &mut Session, input: impl BufRead) -> CliResult<()> {
    output::prompt(PROMPT);
    for line in input.lines() {
        let line = line.map_err(|e| CliError::io("read stdin", e))?;
        match Command::parse(&line) {
            Ok(None) => {}
            Ok(Some(command)) => match execute(session, &command) {
                Ok(outcome) => {
                    print_outcome(&outcome);
                    if command.is_mutation() {
                        output::info(&session.to_tree_string());
                    }
                }
                Err(e) => output::error(&e),
            },
            Err(message) => output::error(&message),
        }
        output::prompt(PROMPT);
    }
    output::info("");
    Ok(())
}

#[instrument]
fn _config(config_path: Option<&Path>, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(config_path)?;
            output::header("Effective configuration");
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = global_config_path().ok_or_else(|| {
                CliError::InvalidArgs("cannot determine config directory".to_string())
            })?;
            if path.exists() && !force {
                return Err(CliError::InvalidArgs(format!(
                    "config already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)
                    .map_err(|e| CliError::io(format!("create {}", dir.display()), e))?;
            }
            fs::write(&path, Settings::template())
                .map_err(|e| CliError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
            Ok(())
        }
        ConfigCommands::Path => {
            output::header("Config paths");
            match global_config_path() {
                Some(path) => output::detail(&describe(&path, "global")),
                None => output::detail("global: <unavailable>"),
            }
            if let Some(path) = config_path {
                output::detail(&describe(path, "explicit"));
            }
            Ok(())
        }
    }
}

fn describe(path: &Path, label: &str) -> String {
    let state = if path.exists() { "exists" } else { "missing" };
    format!("{}: {} ({})", label, path.display(), state)
}
