use anyhow::Result;
use clap::Parser;
use env_logger::Env;

mod cli;
mod generate_cmd;
mod models_cmd;
mod path_guard;
mod plan_cmd;
mod profiles_cmd;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Command::Generate(args) => generate_cmd::run_generate(args),
        Command::Plan(args) => plan_cmd::run_plan(args),
        Command::Profiles(command) => profiles_cmd::run_profiles(command),
        Command::Models(args) => models_cmd::run_models(args, cli.verbose > 0),
    }
}
