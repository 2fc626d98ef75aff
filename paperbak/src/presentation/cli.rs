use clap::{Parser, Subcommand, ValueEnum};
use paperbak_core::digest::DigestKind;
use paperbak_core::export::ExporterKind;
use paperbak_core::text::TextCodec;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Backup and restore files through printable codes",
    long_about = None
)]
pub struct Cli {
    /// Diagnostic progress on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ExporterArg {
    /// One file per code
    Directory,
    /// One document, several codes per page
    Paginated,
}

impl From<ExporterArg> for ExporterKind {
    fn from(a: ExporterArg) -> Self {
        match a {
            ExporterArg::Directory => ExporterKind::Directory,
            ExporterArg::Paginated => ExporterKind::Paginated,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum CodecArg {
    Base85,
    Base64,
    Hex,
}

impl From<CodecArg> for TextCodec {
    fn from(a: CodecArg) -> Self {
        match a {
            CodecArg::Base85 => TextCodec::Base85,
            CodecArg::Base64 => TextCodec::Base64,
            CodecArg::Hex => TextCodec::Hex,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum DigestArg {
    Sha256,
    Blake3,
}

impl From<DigestArg> for DigestKind {
    fn from(a: DigestArg) -> Self {
        match a {
            DigestArg::Sha256 => DigestKind::Sha256,
            DigestArg::Blake3 => DigestKind::Blake3,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split a file into framed, printable codes
    Backup {
        infile: PathBuf,
        /// output directory (directory exporter) or document path (paginated)
        out: PathBuf,

        #[arg(long, value_enum, default_value_t = ExporterArg::Directory)]
        exporter: ExporterArg,

        /// input bytes carried by a single code
        #[arg(long, default_value_t = 256)]
        chunk_size: usize,

        #[arg(long, value_enum, default_value_t = CodecArg::Base85)]
        codec: CodecArg,

        /// file name prefix for the directory exporter
        #[arg(long, default_value = "qr-")]
        prefix: String,

        /// zero-padded width of the code number in file names
        #[arg(long, default_value_t = 4)]
        width: usize,

        /// file extension for the directory exporter
        #[arg(long, default_value = "txt")]
        ext: String,

        #[arg(long, default_value_t = 6)]
        codes_per_page: u64,

        /// print a digest of the input
        #[arg(long, value_enum)]
        digest: Option<DigestArg>,

        /// leave timestamps out of exported documents
        #[arg(long)]
        deterministic: bool,

        /// print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rebuild a file from scanned codes, in any order
    Restore {
        /// directory of code files, or a single document
        input: PathBuf,
        outfile: PathBuf,

        /// file name pattern when INPUT is a directory
        #[arg(long, default_value = "qr-*.txt")]
        pattern: String,

        #[arg(long, value_enum, default_value_t = CodecArg::Base85)]
        codec: CodecArg,

        /// print a digest of the restored file
        #[arg(long, value_enum)]
        digest: Option<DigestArg>,

        /// fail when overlapping codes disagree instead of letting the last one win
        #[arg(long)]
        strict: bool,

        /// fail when holes remain between restored codes; a missing final
        /// code cannot be detected this way, compare --digest output instead
        #[arg(long)]
        require_complete: bool,

        #[arg(long)]
        json: bool,
    },

    /// Decode codes and print what their frames carry
    Inspect {
        /// a code string, or a file to scan for codes
        code: String,

        #[arg(long, value_enum, default_value_t = CodecArg::Base85)]
        codec: CodecArg,
    },
}
