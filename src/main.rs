//! Main entry point for the storezip CLI application.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use storezip::cli::{Command, entry_name};
use storezip::profile::csv::to_csv;
use storezip::profile::csv_with_images;
use storezip::zip::ArchiveBuilder;
use storezip::{Cli, ExportBundle, Fetcher, LocalFileReader, ProfileSet, ZipExtractor};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    match &cli.command {
        Command::Pack {
            output,
            prefix,
            files,
        } => pack(&cli, output, prefix.as_deref(), files).await,
        Command::Export {
            output,
            csv_only,
            inline_images,
            timeout,
            profiles,
        } => {
            let format = if *csv_only {
                ExportFormat::Csv
            } else if *inline_images {
                ExportFormat::CsvWithImages
            } else {
                ExportFormat::Bundle
            };
            export(&cli, output, format, *timeout, profiles).await
        }
        Command::List { verbose, archive } => list_files(archive, *verbose).await,
        Command::Verify { archive } => verify(&cli, archive).await,
    }
}

/// Store `files` in a new archive at `output`.
async fn pack(cli: &Cli, output: &Path, prefix: Option<&str>, files: &[PathBuf]) -> Result<()> {
    let mut zip = ArchiveBuilder::new();
    for path in files {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let name = entry_name(path, prefix);
        if !cli.is_quiet() {
            eprintln!("  storing: {}", name);
        }
        zip.file(name, data);
    }

    let bytes = zip.finish()?;
    tokio::fs::write(output, &bytes)
        .await
        .with_context(|| format!("writing {}", output.display()))?;

    if !cli.is_very_quiet() {
        eprintln!(
            "{}: {} entries, {}",
            output.display(),
            zip.len(),
            format_size(bytes.len() as u64)
        );
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum ExportFormat {
    Csv,
    CsvWithImages,
    Bundle,
}

/// Export the profiles in `input` as a CSV file or a ZIP bundle.
async fn export(
    cli: &Cli,
    output: &Path,
    format: ExportFormat,
    timeout: u64,
    input: &Path,
) -> Result<()> {
    let json = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    let profiles = ProfileSet::from_json(&json)
        .with_context(|| format!("parsing profiles from {}", input.display()))?;

    if profiles.is_empty() {
        bail!("No rows to export");
    }

    let quiet = cli.is_quiet();
    let progress = |i: usize, n: usize| {
        if !quiet {
            eprintln!("Fetching image {}/{}...", i, n);
        }
    };

    let bytes = match format {
        ExportFormat::Csv => to_csv(profiles.as_slice()).into_bytes(),
        ExportFormat::CsvWithImages => {
            let fetcher = Fetcher::with_timeout(Duration::from_secs(timeout))?;
            csv_with_images(profiles.as_slice(), &fetcher, progress)
                .await
                .into_bytes()
        }
        ExportFormat::Bundle => {
            let fetcher = Fetcher::with_timeout(Duration::from_secs(timeout))?;
            ExportBundle::new(profiles.as_slice())
                .build(&fetcher, progress)
                .await?
        }
    };

    tokio::fs::write(output, &bytes)
        .await
        .with_context(|| format!("writing {}", output.display()))?;

    if !cli.is_very_quiet() {
        eprintln!(
            "{}: {} profiles, {}",
            output.display(),
            profiles.len(),
            format_size(bytes.len() as u64)
        );
    }
    Ok(())
}

/// List files in the ZIP archive.
///
/// Simple format prints one name per line; verbose adds size, CRC-32 and
/// local header offset columns plus a summary line.
async fn list_files(archive: &Path, verbose: bool) -> Result<()> {
    let reader = Arc::new(LocalFileReader::new(archive)?);
    let extractor = ZipExtractor::new(reader);
    let entries = extractor.list_files().await?;

    if !verbose {
        for entry in &entries {
            println!("{}", entry.file_name);
        }
        return Ok(());
    }

    println!(
        "{:>10}  {:>8}  {:>10}  {:>6}  Name",
        "Length", "CRC-32", "Offset", "Method"
    );
    println!("{}", "-".repeat(60));

    let mut total = 0u64;
    for entry in &entries {
        println!(
            "{:>10}  {:08x}  {:>10}  {:>6}  {}",
            entry.uncompressed_size,
            entry.crc32,
            entry.lfh_offset,
            entry.compression_method.as_u16(),
            entry.file_name
        );
        total += entry.uncompressed_size;
    }

    println!("{}", "-".repeat(60));
    println!("{:>10}  {:>28}  {} files", total, "", entries.len());
    Ok(())
}

/// Check every entry of `archive`, failing if any does not match.
async fn verify(cli: &Cli, archive: &Path) -> Result<()> {
    let reader = Arc::new(LocalFileReader::new(archive)?);
    let report = ZipExtractor::new(reader).verify().await?;

    if !cli.is_quiet() {
        for name in &report.ok {
            println!("    OK: {}", name);
        }
    }
    for (name, reason) in &report.failed {
        eprintln!("FAILED: {} ({})", name, reason);
    }

    if !report.is_ok() {
        bail!(
            "{} of {} entries failed verification",
            report.failed.len(),
            report.failed.len() + report.ok.len()
        );
    }
    if !cli.is_very_quiet() {
        eprintln!("No errors detected in {}", archive.display());
    }
    Ok(())
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
