use std::process::ExitCode;

use crate::cli::run;

mod catalog;
pub mod cli;
mod config;
pub mod domain;
pub mod http;
pub mod resolve;
pub mod storage;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run()
}
