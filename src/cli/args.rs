//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::application::{HandlerTarget, ScriptedHandler};
use crate::domain::NodePath;

/// Document tree simulator: CSS-like style cascading and DOM-like event bubbling
#[derive(Parser, Debug)]
#[command(name = "domcascade")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, env = "DOMCASCADE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the document structure as a tree
    Tree {
        /// Document definition (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        document: PathBuf,
    },

    /// Apply a stylesheet and print every node with its resolved style
    Cascade {
        #[arg(value_hint = ValueHint::FilePath)]
        document: PathBuf,
        /// Stylesheet (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        stylesheet: PathBuf,
        /// Node to cascade from (its own style is only inherited from)
        #[arg(long, default_value = ".")]
        from: NodePath,
    },

    /// List descendants of a type that carry resolved styles
    Find {
        #[arg(value_hint = ValueHint::FilePath)]
        document: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        stylesheet: PathBuf,
        /// Element type to look for
        tag: String,
        #[arg(long, default_value = ".")]
        from: NodePath,
    },

    /// Print the full style hierarchy after cascading
    Hierarchy {
        #[arg(value_hint = ValueHint::FilePath)]
        document: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        stylesheet: PathBuf,
        #[arg(long, default_value = ".")]
        from: NodePath,
    },

    /// Display visual nodes with colours from their resolved styles
    Render {
        #[arg(value_hint = ValueHint::FilePath)]
        document: PathBuf,
        /// Optional stylesheet cascaded from the root before display
        #[arg(value_hint = ValueHint::FilePath)]
        stylesheet: Option<PathBuf>,
    },

    /// Register handlers, fire an event and show how it bubbled
    Dispatch {
        #[arg(value_hint = ValueHint::FilePath)]
        document: PathBuf,
        /// Node to handle the event on, e.g. 1.0.0
        #[arg(long)]
        at: NodePath,
        /// Event name
        #[arg(short, long)]
        event: String,
        /// Handler as <path>:<event>=<continue|stop>
        #[arg(long = "on")]
        handlers: Vec<ScriptedHandler>,
        /// Retire a handler after registration: <path>:<event>
        #[arg(long = "off")]
        retire: Vec<HandlerTarget>,
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
    /// Show effective settings as TOML
    Show,
    /// Print a commented template config
    Template,
    /// Print the global config file location
    Path,
}
