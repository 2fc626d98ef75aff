//! Where encoded codes go on backup.
//!
//! Turning a code string into a picture belongs to an external generator;
//! the exporters here lay the strings out the way the pictures would be
//! laid out, one file per code or one paginated document.

use crate::digest::DigestKind;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExporterKind {
    #[default]
    Directory,
    Paginated,
}

/// `qr-0001.txt`, `qr-0002.txt`, ...
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeNaming {
    pub prefix: String,
    pub width: usize,
    pub ext: String,
}

impl Default for CodeNaming {
    fn default() -> Self {
        Self {
            prefix: "qr-".to_string(),
            width: 4,
            ext: "txt".to_string(),
        }
    }
}

impl CodeNaming {
    pub fn file_name(&self, number: u64) -> String {
        format!("{}{:0w$}.{}", self.prefix, number, self.ext, w = self.width)
    }

    /// Glob that matches every name this produces.
    pub fn pattern(&self) -> String {
        format!("{}*.{}", self.prefix, self.ext)
    }
}

pub struct DirectoryExporter {
    dir: PathBuf,
    naming: CodeNaming,
    count: u64,
}

impl DirectoryExporter {
    pub fn new(dir: &Path, naming: CodeNaming) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            naming,
            count: 0,
        })
    }

    fn accept(&mut self, code: &str) -> Result<()> {
        self.count += 1;
        let path = self.dir.join(self.naming.file_name(self.count));
        let mut f = File::create(path)?;
        f.write_all(code.as_bytes())?;
        f.write_all(b"\n")?;
        Ok(())
    }
}

/// Annotation lines always contain a space; code lines never do.
pub struct PaginatedExporter {
    out: BufWriter<File>,
    codes_per_page: u64,
    total_pages: u64,
    deterministic: bool,
    count: u64,
}

impl PaginatedExporter {
    pub fn new(
        path: &Path,
        expected_codes: u64,
        codes_per_page: u64,
        deterministic: bool,
    ) -> Result<Self> {
        let codes_per_page = codes_per_page.max(1);
        Ok(Self {
            out: BufWriter::new(File::create(path)?),
            codes_per_page,
            total_pages: expected_codes.div_ceil(codes_per_page).max(1),
            deterministic,
            count: 0,
        })
    }

    fn accept(&mut self, code: &str) -> Result<()> {
        if self.count % self.codes_per_page == 0 {
            if self.count > 0 {
                self.out.write_all(b"\x0c\n")?;
            }
            let page = self.count / self.codes_per_page + 1;
            // The count is only an estimate; never print "page 3 of 2".
            let of = self.total_pages.max(page);
            writeln!(self.out, "page {page} of {of}")?;
        }
        writeln!(self.out, "{code}")?;
        self.count += 1;
        Ok(())
    }

    fn finish(mut self, digest: Option<(DigestKind, &str)>) -> Result<()> {
        writeln!(self.out, "codes: {}", self.count)?;
        if let Some((kind, hex)) = digest {
            writeln!(self.out, "{} of input: {hex}", kind.label())?;
        }
        if !self.deterministic {
            let now = OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            writeln!(self.out, "created: {now}")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

pub enum Exporter {
    Directory(DirectoryExporter),
    Paginated(PaginatedExporter),
}

impl Exporter {
    pub fn accept(&mut self, code: &str) -> Result<()> {
        match self {
            Exporter::Directory(e) => e.accept(code),
            Exporter::Paginated(e) => e.accept(code),
        }
    }

    pub fn accepted(&self) -> u64 {
        match self {
            Exporter::Directory(e) => e.count,
            Exporter::Paginated(e) => e.count,
        }
    }

    pub fn finish(self, digest: Option<(DigestKind, &str)>) -> Result<()> {
        match self {
            Exporter::Directory(_) => Ok(()),
            Exporter::Paginated(e) => e.finish(digest),
        }
    }
}
