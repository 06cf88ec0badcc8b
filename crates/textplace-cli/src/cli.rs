use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use textplace::UnicodeNorm;

/// List positioned text runs and the fonts that draw them in PDF documents.
#[derive(Debug, Parser)]
#[command(name = "textplace", about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print page count, placement count, and fonts as JSON
    Summary {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Maximum nesting depth of form XObjects
        #[arg(long, default_value_t = 10)]
        max_depth: usize,
    },

    /// List every text placement with its bounding box
    Placements {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// 0-based, end-exclusive page range (e.g. '2..5', '3..', '4'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = PlacementFormat::Text)]
        format: PlacementFormat,

        /// Apply Unicode normalization to placement text
        #[arg(long, value_enum)]
        unicode_norm: Option<UnicodeNormArg>,

        /// Maximum nesting depth of form XObjects
        #[arg(long, default_value_t = 10)]
        max_depth: usize,

        /// Print extraction warnings to stderr
        #[arg(long)]
        warnings: bool,
    },

    /// List the fonts used by the document
    Fonts {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Output format for `placements`.
#[derive(Debug, Clone, ValueEnum)]
pub enum PlacementFormat {
    /// Tab-separated, one placement per line
    Text,
    /// A single JSON array
    Json,
    /// One JSON object per line
    Jsonl,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Unicode normalization form accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnicodeNormArg {
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
}

impl From<UnicodeNormArg> for UnicodeNorm {
    fn from(arg: UnicodeNormArg) -> Self {
        match arg {
            UnicodeNormArg::Nfc => UnicodeNorm::Nfc,
            UnicodeNormArg::Nfd => UnicodeNorm::Nfd,
            UnicodeNormArg::Nfkc => UnicodeNorm::Nfkc,
            UnicodeNormArg::Nfkd => UnicodeNorm::Nfkd,
        }
    }
}
