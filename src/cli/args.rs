//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Inspect TOML/JSON documents as structured containers: render, iterate, project, simplify
#[derive(Parser, Debug)]
#[command(name = "structured")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
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
    /// Render a document
    Show {
        /// Document file (.toml or .json)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Render as a tree regardless of settings
        #[arg(long)]
        tree: bool,
    },

    /// Print each iteration item (a bare root group is flattened)
    Iter {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Bracket read: `root`, `None`, a slot name, or an index into a root group
    Get {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// `None` always selects the root, so a slot literally named `None`
        /// is not reachable here; digits are read as an index
        key: String,
    },

    /// Attribute read, projecting mapped attributes onto every leaf
    Attr {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        name: String,
    },

    /// Collapse root-only wrappers
    Simplify {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Leave nested containers untouched
        #[arg(long)]
        no_recurse: bool,
        /// Never return the bare root payload
        #[arg(long)]
        keep_root: bool,
    },

    /// Print the mapping view as JSON
    Dict {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Do not convert nested containers
        #[arg(long)]
        shallow: bool,
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
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
    /// Print a template config file
    Template,
}
