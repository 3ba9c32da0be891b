mod classify;
mod config;
mod discovery;
mod docs;
mod expect;
mod failure_log;
mod leaks;
mod logger;
mod normalize;
mod report;
mod state;
mod test_harness;

use std::error::Error;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "morphocheck",
    version,
    about = "Regression harnesses for the morpho interpreter: memory leaks under valgrind and help coverage."
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run every test script under the memory checker and report leaks
    Leaks(leaks::LeakArgs),
    /// Check that every method of the core classes has a help entry
    Docs(docs::DocsArgs),
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();

    let failed = match cli.command {
        CliCommand::Leaks(args) => leaks::run(args)?,
        CliCommand::Docs(args) => docs::run(args)?,
    };

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
