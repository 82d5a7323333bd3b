//! AvatarLib CLI - Command-line interface for merging animator controllers

use clap::Parser;
use std::process::ExitCode;

use avatarlib_cli::{commands, logging};

mod cli_args;

use cli_args::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    let result = match cli.command {
        Commands::Merge { plan, output, json } => {
            commands::merge::run(&plan, output.as_deref(), json)
        }
        Commands::Inspect { input, json } => commands::inspect::run(&input, json),
        Commands::Rebase {
            input,
            path,
            output,
        } => commands::rebase::run(&input, &path, &output),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
