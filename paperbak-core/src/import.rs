//! Where scanned images come from on restore, and how codes are read out
//! of them.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Reads every code visible in one image. Zero, one or many results are all
/// normal.
pub trait CodeScanner {
    fn scan(&self, image: &[u8]) -> Vec<String>;
}

/// Treats an image as text: each trimmed, non-empty line without inner
/// whitespace is one code. Annotation lines are skipped.
pub struct TextScanner;

impl CodeScanner for TextScanner {
    fn scan(&self, image: &[u8]) -> Vec<String> {
        String::from_utf8_lossy(image)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.contains(char::is_whitespace))
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Image {
    pub name: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Importer {
    DirectoryScan { dir: PathBuf, pattern: String },
    SingleImage(PathBuf),
}

impl Importer {
    /// Directories are scanned, anything else is one image.
    pub fn for_path(path: &Path, pattern: &str) -> Self {
        if path.is_dir() {
            Importer::DirectoryScan {
                dir: path.to_path_buf(),
                pattern: pattern.to_string(),
            }
        } else {
            Importer::SingleImage(path.to_path_buf())
        }
    }

    /// Image paths in the order they will be processed.
    pub fn paths(&self) -> Result<Vec<PathBuf>> {
        match self {
            Importer::SingleImage(p) => Ok(vec![p.clone()]),
            Importer::DirectoryScan { dir, pattern } => {
                let mut out = Vec::new();
                for e in WalkDir::new(dir)
                    .min_depth(1)
                    .max_depth(1)
                    .sort_by_file_name()
                {
                    let e = e.map_err(std::io::Error::other)?;
                    if e.file_type().is_file()
                        && matches_pattern(&e.file_name().to_string_lossy(), pattern)
                    {
                        out.push(e.into_path());
                    }
                }
                Ok(out)
            }
        }
    }

    /// Loads images lazily, one at a time.
    pub fn images(&self) -> Result<impl Iterator<Item = Result<Image>> + use<>> {
        let paths = self.paths()?;
        Ok(paths.into_iter().map(|p| {
            let data = fs::read(&p)?;
            Ok(Image {
                name: p.display().to_string(),
                data,
            })
        }))
    }
}

/// Single-`*` glob on a file name; no `*` means an exact match.
pub fn matches_pattern(name: &str, pattern: &str) -> bool {
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            name.len() >= prefix.len() + suffix.len()
                && name.starts_with(prefix)
                && name.ends_with(suffix)
        }
        None => name == pattern,
    }
}
