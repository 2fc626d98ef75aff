use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use paperbak_core::digest::DigestKind;
use paperbak_core::error::{PaperbakError, Result};
use paperbak_core::export::{
    CodeNaming, DirectoryExporter, Exporter, ExporterKind, PaginatedExporter,
};
use paperbak_core::import::{CodeScanner, Importer, TextScanner};
use paperbak_core::restore::RejectKind;
use paperbak_core::sequencer::expected_chunks;
use paperbak_core::text::TextCodec;
use paperbak_core::{BackupOptions, RestoreOptions, backup, decode_code, restore};
use serde::Serialize;
use tracing::{info, warn};

use super::progress::TracingProgress;

pub struct BackupArgs {
    pub infile: PathBuf,
    pub out: PathBuf,
    pub exporter: ExporterKind,
    pub chunk_size: usize,
    pub codec: TextCodec,
    pub prefix: String,
    pub width: usize,
    pub ext: String,
    pub codes_per_page: u64,
    pub digest: Option<DigestKind>,
    pub deterministic: bool,
    pub json: bool,
}

pub struct RestoreArgs {
    pub input: PathBuf,
    pub outfile: PathBuf,
    pub pattern: String,
    pub codec: TextCodec,
    pub digest: Option<DigestKind>,
    pub strict: bool,
    pub require_complete: bool,
    pub json: bool,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    println!("{s}");
    Ok(())
}

fn setup_exporter(a: &BackupArgs, expected: u64) -> Result<Exporter> {
    match a.exporter {
        ExporterKind::Directory => {
            info!("Setting up directory exporter at {}", a.out.display());
            let naming = CodeNaming {
                prefix: a.prefix.clone(),
                width: a.width,
                ext: a.ext.clone(),
            };
            Ok(Exporter::Directory(DirectoryExporter::new(&a.out, naming)?))
        }
        ExporterKind::Paginated => {
            info!("Setting up paginated exporter at {}", a.out.display());
            Ok(Exporter::Paginated(PaginatedExporter::new(
                &a.out,
                expected,
                a.codes_per_page,
                a.deterministic,
            )?))
        }
    }
}

pub fn handle_backup(a: BackupArgs) -> Result<()> {
    let opts = BackupOptions {
        chunk_size: a.chunk_size,
        codec: a.codec,
        digest: a.digest,
    };
    opts.validate()?;

    info!("Encoding codes as {}", a.codec.name());
    let f = File::open(&a.infile)?;
    let total = f.metadata()?.len();
    let exporter = setup_exporter(&a, expected_chunks(total, opts.chunk_size))?;

    let summary = backup(BufReader::new(f), total, exporter, &opts, &mut TracingProgress)?;

    if a.json {
        return print_json(&summary);
    }
    if let (Some(kind), Some(hex)) = (summary.digest_kind, &summary.digest) {
        println!("{} of input: {hex}", kind.label());
    }
    Ok(())
}

pub fn handle_restore(a: RestoreArgs) -> Result<()> {
    if !a.input.exists() {
        return Err(PaperbakError::Config(format!(
            "input not found: {}",
            a.input.display()
        )));
    }
    let importer = Importer::for_path(&a.input, &a.pattern);
    info!("Setting up importer: {importer:?}");
    info!("Decoding codes as {}", a.codec.name());

    // Read access for the digest pass after all writes.
    let sink = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&a.outfile)?;

    let opts = RestoreOptions {
        codec: a.codec,
        digest: a.digest,
        strict: a.strict,
        require_complete: a.require_complete,
    };
    let (_, summary) = restore(
        importer.images()?,
        &TextScanner,
        sink,
        &opts,
        &mut TracingProgress,
    )?;

    for g in &summary.gaps {
        warn!("Missing bytes {}..{}", g.start, g.end);
    }
    if summary.rejected.total() > 0 {
        warn!(
            "{} code(s) skipped: {:?}",
            summary.rejected.total(),
            summary.rejected
        );
    }

    if a.json {
        return print_json(&summary);
    }
    if let (Some(kind), Some(hex)) = (summary.digest_kind, &summary.digest) {
        println!("{} of output: {hex}", kind.label());
    }
    Ok(())
}

pub fn handle_inspect(code: String, codec: TextCodec) -> Result<()> {
    let path = Path::new(&code);
    let codes = if path.is_file() {
        TextScanner.scan(&std::fs::read(path)?)
    } else {
        vec![code.clone()]
    };

    for (i, c) in codes.iter().enumerate() {
        match decode_code(codec, c) {
            Ok(f) => println!(
                "#{:<5} offset={:<10} len={:<6} crc={:#010x}",
                i,
                f.offset,
                f.payload.len(),
                f.checksum
            ),
            Err(e) => match RejectKind::classify(&e) {
                Some(kind) => println!("#{i:<5} rejected ({kind:?}): {e}"),
                None => return Err(e),
            },
        }
    }
    Ok(())
}
