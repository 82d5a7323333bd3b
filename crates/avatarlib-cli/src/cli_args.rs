//! CLI argument definitions for the AvatarLib command-line interface.

use clap::{Parser, Subcommand};

/// AvatarLib - Animator controller merging tools
#[derive(Parser)]
#[command(name = "avatarlib")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Merge the controller documents listed in a plan file
    Merge {
        /// Path to the merge plan (JSON)
        #[arg(short, long)]
        plan: String,

        /// Output path, overriding the plan's
        #[arg(short, long)]
        output: Option<String>,

        /// Output a machine-readable JSON summary (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Summarize the layers and parameters of a controller document
    Inspect {
        /// Path to the controller document
        #[arg(short, long)]
        input: String,

        /// Output a machine-readable JSON summary (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Rebase the curve bindings of a clip document below a hierarchy path
    Rebase {
        /// Path to the clip document
        #[arg(short, long)]
        input: String,

        /// Hierarchy path to move bindings below
        #[arg(short, long)]
        path: String,

        /// Path of the rebased clip document
        #[arg(short, long)]
        output: String,
    },
}
