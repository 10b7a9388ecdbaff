use clap::{Parser, Subcommand};
use std::path::{Component, Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "storezip")]
#[command(version)]
#[command(about = "Write and check uncompressed ZIP archives and profile exports", long_about = None)]
#[command(after_help = "Examples:\n  \
  storezip pack -o out.zip a.txt docs/b.txt     store two files\n  \
  storezip export -o profiles.zip rows.json     CSV plus images/ as a ZIP\n  \
  storezip export --inline-images -o p.csv rows.json  CSV with data URIs\n  \
  storezip verify profiles.zip                  check every entry's CRC-32")]
pub struct Cli {
    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store local files in a new archive
    Pack {
        /// Archive to create
        #[arg(short = 'o', value_name = "ZIP")]
        output: PathBuf,

        /// Folder inside the archive to place the files under
        #[arg(short = 'C', long = "prefix", value_name = "DIR")]
        prefix: Option<String>,

        /// Files to store, named by their relative paths
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },

    /// Export a JSON array of profiles as CSV or as a ZIP with images
    Export {
        /// Output file (.zip, or .csv with --csv-only)
        #[arg(short = 'o', value_name = "FILE")]
        output: PathBuf,

        /// Write only the CSV, without fetching images
        #[arg(long)]
        csv_only: bool,

        /// Write a CSV with each image embedded as a data URI
        #[arg(long, conflicts_with = "csv_only")]
        inline_images: bool,

        /// HTTP timeout per image, in seconds
        #[arg(long, value_name = "SECS", default_value_t = 30)]
        timeout: u64,

        /// Profiles as stored by the extension
        #[arg(value_name = "PROFILES")]
        profiles: PathBuf,
    },

    /// List archive contents
    List {
        /// Show sizes, CRC-32 and offsets
        #[arg(short = 'v')]
        verbose: bool,

        #[arg(value_name = "ZIP")]
        archive: PathBuf,
    },

    /// Extract every entry in memory and check sizes and CRC-32
    Verify {
        #[arg(value_name = "ZIP")]
        archive: PathBuf,
    },
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Log level before `RUST_LOG` is applied: warnings, errors only
    /// with `-q`, nothing with `-qq`.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.quiet {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Error,
            _ => log::LevelFilter::Off,
        }
    }
}

/// Archive name for a local `path`: `/`-separated, without root, `.` or
/// `..` components, optionally below `prefix`.
pub fn entry_name(path: &Path, prefix: Option<&str>) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().replace('\\', "/")),
            _ => None,
        })
        .collect();
    let name = parts.join("/");

    match prefix.map(|p| p.trim_matches('/')) {
        Some(p) if !p.is_empty() => format!("{}/{}", p, name),
        _ => name,
    }
}
