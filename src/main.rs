mod config;
mod fs;
mod git;
mod progress;
mod services;
mod ssh;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::read_config;
use crate::services::run_deploy::run_deploy;
use crate::util::TerminalSecrets;

fn main() -> ExitCode {
    let config_path = std::env::args().nth(1).map(PathBuf::from);

    let config = match read_config(config_path) {
        Ok(config) => config,
        Err(err) => {
            progress::failure(format!("Error: {err:#}"));
            return ExitCode::FAILURE;
        }
    };

    match run_deploy(&config, &TerminalSecrets) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            progress::failure(format!("Error: {err:#}"));
            ExitCode::FAILURE
        }
    }
}
