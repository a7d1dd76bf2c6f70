use clap::Parser;
use env_logger::Env;
use phototidy::cli::{Cli, run_cli};
use phototidy::signal::setup_shutdown_signal;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let shutdown_signal = setup_shutdown_signal();

    match run_cli(&cli, shutdown_signal) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
