//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// In-memory directory/file tree with a flattened, render-ready view
#[derive(Parser, Debug)]
#[command(name = "dirtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the seeded tree
    Show {
        /// Also print the flattened mapping
        #[arg(long)]
        flat: bool,
    },

    /// Execute a command script, then print the tree
    Run {
        /// Script file, one command per line
        #[arg(value_hint = ValueHint::FilePath)]
        script: PathBuf,
        /// Start from an empty tree instead of the seed
        #[arg(long)]
        empty: bool,
        /// Also print the flattened mapping
        #[arg(long)]
        flat: bool,
    },

    /// Read commands from stdin interactively
    Repl {
        /// Start from an empty tree instead of the seed
        #[arg(long)]
        empty: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create global config template
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
