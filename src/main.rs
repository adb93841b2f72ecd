//! Inscrypt - Encrypt, then hide
//!
//! A CLI tool that encrypts a secret with a stack of ciphers and hides it in
//! an image, audio or video file.

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;

use inscrypt::{InscryptError, Settings};

use commands::{
    CapacityCommand, CodebookCommand, CommandExecutor, EmbedCommand, ExtractCommand,
    SupportedCommand,
};

/// Inscrypt - Encrypt, then hide
///
/// Cascading encryption plus steganography for images, audio and video.
#[derive(Parser)]
#[command(name = "inscrypt")]
#[command(version = inscrypt::VERSION)]
#[command(about = "Cascading encryption and steganography for images, audio and video")]
#[command(long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a secret and hide it in a cover file
    Embed(EmbedCommand),

    /// Recover a hidden secret
    Extract(ExtractCommand),

    /// Show how much a cover can hold
    Capacity(CapacityCommand),

    /// List supported ciphers, hashes and techniques
    Supported(SupportedCommand),

    /// Verify a codebook and show its configuration
    Codebook(CodebookCommand),
}

impl Commands {
    fn executor(&self) -> &dyn CommandExecutor {
        match self {
            Commands::Embed(cmd) => cmd,
            Commands::Extract(cmd) => cmd,
            Commands::Capacity(cmd) => cmd,
            Commands::Supported(cmd) => cmd,
            Commands::Codebook(cmd) => cmd,
        }
    }
}

fn init_logging(verbose: u8, settings: &Settings) {
    let level = match verbose {
        0 => settings.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli, settings: &Settings) -> Result<()> {
    cli.command.executor().execute(settings)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (settings, settings_error) = match Settings::load() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    init_logging(cli.verbose, &settings);
    if let Some(e) = settings_error {
        log::warn!("ignoring settings file: {}", e);
    }

    match run(&cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.chain().find_map(|cause| cause.downcast_ref::<InscryptError>()) {
                Some(core) => {
                    let context = err.to_string();
                    if context != core.to_string() {
                        eprintln!("{}", context);
                    }
                    eprintln!("error[{}]: {}", core.kind(), core);
                }
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
