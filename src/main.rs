//! Auris CLI - Audio Inspection Toolkit
//!
//! Command-line interface for the Auris audio inspector.

use clap::Parser;
use env_logger::Env;
use log::{debug, info};

use auris::cli::commands;
use auris::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG still wins over --verbose
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Auris Audio Inspector v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Auris Audio Inspector v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    debug!("Running {:?}", cmd);

    let result = match cmd {
        Commands::Info { input, json } => commands::info_cmd(&input, json),
        Commands::Process {
            input,
            output,
            ops,
            pipeline,
            bit_depth,
        } => commands::process(&input, &output, &ops, pipeline.as_deref(), bit_depth),
        Commands::Spectrum {
            input,
            channel,
            db,
            json,
        } => commands::spectrum_cmd(&input, channel, db, json),
        Commands::Waveform { input, max_points } => commands::waveform_cmd(&input, max_points),
    };

    result.map_err(|e| {
        for hint in e.recovery_suggestions() {
            eprintln!("hint: {}", hint);
        }
        let code = e.error_code();
        anyhow::Error::new(e).context(code)
    })
}
