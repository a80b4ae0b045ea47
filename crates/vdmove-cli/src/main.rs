//! vdmove CLI - Move a Yandex Disk tree into a virtual disk
//!
//! Provides commands for:
//! - Migrating the personal disk (or one folder of it) into a virtual disk
//! - Listing what a migration would pick up
//! - Inspecting and validating configuration

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    config::ConfigCommand, list::ListCommand, migrate::MigrateCommand, CommandContext,
    InvalidConfig,
};
use output::{get_formatter, OutputFormat};

/// Exit status for configuration problems
const EXIT_CONFIG: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "vdmove",
    version,
    about = "Move Yandex Disk files into a virtual disk"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Move every file and folder into the virtual disk
    Migrate(MigrateCommand),
    /// List the source tree
    List(ListCommand),
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Level for the log filter when `RUST_LOG` is unset
fn log_directive(verbose: u8, configured: &str) -> &str {
    match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8, configured: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(verbose, configured)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli, ctx: CommandContext) -> Result<()> {
    match cli.command {
        Commands::Migrate(cmd) => cmd.execute(&ctx).await,
        Commands::List(cmd) => cmd.execute(&ctx).await,
        Commands::Config(cmd) => cmd.execute(&ctx).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let formatter = get_formatter(format);

    let ctx = match CommandContext::load(cli.config.as_deref(), format) {
        Ok(ctx) => ctx,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    init_tracing(cli.verbose, &ctx.config.logging.level, cli.json);

    match run(cli, ctx).await {
        Ok(()) => ExitCode::SUCCESS,
        // already reported with guidance
        Err(e) if e.is::<InvalidConfig>() => ExitCode::from(EXIT_CONFIG),
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
