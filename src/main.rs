pub mod batch;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod dbml;
pub mod error;
pub mod graph;
pub mod ir;
pub mod path_de;
pub mod pipeline;

use std::process::ExitCode;

use colored::Colorize;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Diagnostics go to stderr so single-file mode can stream DBML on stdout.
fn init_logging(level: tracing::Level) {
    // built from the flag only; RUST_LOG is ignored
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy("");
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> ExitCode {
    let command_line_interface = cli::CommandLineInterface::load();
    init_logging(command_line_interface.log_level());
    match command_line_interface.run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
