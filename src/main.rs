use clap::{Parser, Subcommand};

mod commands;
mod output;
mod tty;

use commands::{rules, run, GlobalArgs};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "tokenfix")]
#[command(version = VERSION)]
#[command(about = "Normalize hardcoded colors and brand strings to design tokens")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a source tree and rewrite color literals to design tokens
    Run(run::RunArgs),
    /// Show the configured rule tables and scan filter
    Rules(rules::RulesArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs {};

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    let _ = output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
