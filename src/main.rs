mod cli;
mod config;
mod logging;
mod prep_x_cmd;
mod prep_y_cmd;

use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::PrepX(args) => prep_x_cmd::run(args),
        Command::PrepY(args) => prep_y_cmd::run(args),
    }
}
