//! Capacity command - how much a cover can hold.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use inscrypt::{stego, Settings, StegoTechnique};

use super::{read_limited, to_cover, CommandExecutor};

/// Show how many bytes each technique can hide in a cover.
///
/// Figures are payload capacity after the embedded header; encryption and
/// framing take a few dozen bytes of that.
#[derive(Args, Debug)]
pub struct CapacityCommand {
    /// Cover file to inspect
    #[arg(short, long)]
    pub cover: PathBuf,

    /// Cover MIME type; detected from content if omitted
    #[arg(long)]
    pub mime: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct CapacityRow {
    technique: &'static str,
    bits: u64,
    bytes: u64,
}

impl CommandExecutor for CapacityCommand {
    fn execute(&self, settings: &Settings) -> Result<()> {
        let bytes = read_limited(&self.cover, settings.limits.max_cover_bytes, "cover")?;
        let cover = to_cover(bytes, self.mime.as_deref())?;

        let rows = StegoTechnique::for_category(cover.category())
            .map(|technique| -> Result<CapacityRow> {
                let bits = stego::resolve(technique, cover.category())?.capacity(&cover)?;
                Ok(CapacityRow {
                    technique: technique.id(),
                    bits,
                    bytes: bits / 8,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        println!("{} cover: {}", cover.category(), self.cover.display());
        for row in rows {
            println!("  {:<14} {:>12} bytes ({} bits)", row.technique, row.bytes, row.bits);
        }
        Ok(())
    }
}
