//! Supported command - list algorithms and techniques.

use anyhow::Result;
use clap::Args;

use inscrypt::{capabilities, MediaCategory, Settings};

use super::CommandExecutor;

/// List supported ciphers, hashes and steganography techniques.
#[derive(Args, Debug)]
pub struct SupportedCommand {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl CommandExecutor for SupportedCommand {
    fn execute(&self, _settings: &Settings) -> Result<()> {
        let caps = capabilities();

        if self.json {
            println!("{}", serde_json::to_string_pretty(caps)?);
            return Ok(());
        }

        println!("Ciphers (up to {} layers):", caps.max_cipher_layers);
        for id in &caps.cipher_algorithms {
            println!("  {}", id);
        }

        println!("Hashes:");
        for id in &caps.hash_algorithms {
            println!("  {}", id);
        }

        for category in MediaCategory::ALL {
            println!("{} techniques:", category);
            for technique in caps.steganography_techniques.get(&category).into_iter().flatten() {
                println!("  {:<14} {}", technique.id, technique.description);
            }
        }
        Ok(())
    }
}
