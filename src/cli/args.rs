//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::{LayoutType, LineType};

/// Organizational hierarchy engine: build, classify and lay out the org structure
#[derive(Parser, Debug)]
#[command(name = "orgchart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding .orgchart.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// JSON store file, overrides configuration
    #[arg(short, long, global = true, env = "ORGCHART_STORE", value_hint = ValueHint::FilePath)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the structure as a tree (staff entries marked)
    Tree,

    /// Print the classified, geometry-annotated structure as JSON
    Layout {
        /// Single-line output
        #[arg(long)]
        compact: bool,
    },

    /// Add a node
    Add(AddArgs),

    /// Delete a node (its children become orphans)
    Delete {
        /// Node id
        id: String,
    },

    /// List the active member directory
    Members,

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

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("content").required(true).args(["member", "title"])))]
pub struct AddArgs {
    /// Parent node id (omit for a new root)
    #[arg(short, long)]
    pub parent: Option<String>,

    /// Member id from the active directory
    #[arg(short, long)]
    pub member: Option<String>,

    /// Custom card title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Custom card position (with --title)
    #[arg(long, requires = "title")]
    pub position: Option<String>,

    /// Connector style
    #[arg(long, value_enum, default_value_t = LineArg::Solid)]
    pub line: LineArg,

    /// Lane under the parent
    #[arg(long, value_enum, default_value_t = LayoutArg::Standard)]
    pub layout: LayoutArg,

    /// Sibling position (default: after the last sibling)
    #[arg(long)]
    pub sort_order: Option<i64>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineArg {
    Solid,
    Dotted,
}

impl From<LineArg> for LineType {
    fn from(value: LineArg) -> Self {
        match value {
            LineArg::Solid => LineType::Solid,
            LineArg::Dotted => LineType::Dotted,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutArg {
    Standard,
    StaffRight,
}

impl From<LayoutArg> for LayoutType {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::Standard => LayoutType::Standard,
            LayoutArg::StaffRight => LayoutType::StaffRight,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show config file locations
    Path,
    /// Print a commented config template
    Template,
}
