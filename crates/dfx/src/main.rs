//! dfx CLI - translation markup and theme toolkit.
//!
//! Provides commands for:
//! - `render`: Render a translation string to HTML or text
//! - `theme show|set|toggle`: Inspect and change the persisted theme

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RenderArgs, ThemeCommand};
use output::Output;

/// dfx - translation markup and theme toolkit.
#[derive(Parser)]
#[command(name = "dfx", version, about)]
struct Cli {
    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a translation string.
    Render(RenderArgs),
    /// Theme preference commands.
    #[command(subcommand)]
    Theme(ThemeCommand),
}

/// `--verbose` enables INFO level, otherwise use `RUST_LOG` or default to WARN.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Theme(cmd) => cmd.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_levels() {
        // SAFETY: only this test touches RUST_LOG
        unsafe {
            std::env::remove_var("RUST_LOG");
        }
        assert_eq!(log_filter(false).to_string(), "warn");
        assert_eq!(log_filter(true).to_string(), "info");

        unsafe {
            std::env::set_var("RUST_LOG", "debug");
        }
        assert_eq!(log_filter(false).to_string(), "debug");
        unsafe {
            std::env::remove_var("RUST_LOG");
        }
    }
}
