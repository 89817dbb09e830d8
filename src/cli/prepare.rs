//! Prepare command implementation

use crate::cli::PrepareArgs;
use crate::clients::transactions::{prepare, PrepareStats};
use std::fs::File;
use std::io::{BufReader, BufWriter};

/// Handle `fiche prepare` command
pub fn handle_prepare(args: &PrepareArgs) -> Result<PrepareStats, Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        )
        .into());
    }

    let input = File::open(&args.input)
        .map_err(|e| format!("Cannot open {}: {}", args.input.display(), e))?;
    let output = File::create(&args.output)?;

    let stats = prepare(BufReader::new(input), BufWriter::new(output))?;

    println!(
        "✓ Transaction table written: {} ({} of {} rows kept)",
        args.output.display(),
        stats.written,
        stats.read
    );
    println!(
        "  dropped: {} repeated headers, {} other property types, {} duplicates",
        stats.header_rows, stats.other_types, stats.duplicates
    );

    Ok(stats)
}
