//! The inspectrs binary -- parse the command line, run the selected subcommand, render any
//! error on stderr.

use clap::Parser;
use inspectrs::cli::command::{
    run,
    Cli,
};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    match run(cli, &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");

            ExitCode::FAILURE
        }
    }
}
