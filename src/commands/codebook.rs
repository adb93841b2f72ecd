//! Codebook command - verify a codebook and show what it records.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use inscrypt::{Codebook, Settings};

use super::CommandExecutor;

/// Verify a codebook's checksum and print the pipeline it describes.
#[derive(Args, Debug)]
pub struct CodebookCommand {
    /// Codebook JSON file
    pub path: PathBuf,
}

impl CommandExecutor for CodebookCommand {
    fn execute(&self, _settings: &Settings) -> Result<()> {
        let raw = fs::read(&self.path)
            .with_context(|| format!("Failed to read codebook {}", self.path.display()))?;

        let codebook = Codebook::parse(&raw)?;
        let config = codebook.to_config()?;

        println!("Codebook OK (version {}, created {})", codebook.version, codebook.timestamp);
        for layer in config.cipher_layers() {
            println!("  layer {}: {}", layer.position, layer.algorithm);
        }
        println!("  hash: {}", config.hash_algorithm());
        println!("  technique: {}", config.stego_technique());
        Ok(())
    }
}
