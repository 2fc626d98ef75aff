pub mod handlers;
pub mod progress;

use crate::presentation::cli::{Cli, Commands};
use paperbak_core::error::Result;

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Backup {
            infile,
            out,
            exporter,
            chunk_size,
            codec,
            prefix,
            width,
            ext,
            codes_per_page,
            digest,
            deterministic,
            json,
        } => handlers::handle_backup(handlers::BackupArgs {
            infile,
            out,
            exporter: exporter.into(),
            chunk_size,
            codec: codec.into(),
            prefix,
            width,
            ext,
            codes_per_page,
            digest: digest.map(Into::into),
            deterministic,
            json,
        }),
        Commands::Restore {
            input,
            outfile,
            pattern,
            codec,
            digest,
            strict,
            require_complete,
            json,
        } => handlers::handle_restore(handlers::RestoreArgs {
            input,
            outfile,
            pattern,
            codec: codec.into(),
            digest: digest.map(Into::into),
            strict,
            require_complete,
            json,
        }),
        Commands::Inspect { code, codec } => handlers::handle_inspect(code, codec.into()),
    }
}
