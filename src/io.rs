use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::document::ContractDocument;
use crate::error::{InputError, InputResult};
use crate::parser;

/// Read a markup file, replacing invalid UTF-8 with U+FFFD.
pub fn read_markup(path: &Path) -> InputResult<String> {
    if !path.is_file() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn load_document(path: &Path, max_nodes: usize) -> InputResult<ContractDocument> {
    let raw = read_markup(path)?;
    Ok(parser::parse_document(&raw, max_nodes))
}

/// Load a previously written document JSON.
pub fn read_document_json(path: &Path) -> InputResult<ContractDocument> {
    let raw = read_markup(path)?;
    serde_json::from_str(&raw).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn to_json(doc: &ContractDocument, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(doc)
    } else {
        serde_json::to_string_pretty(doc)
    }
}

/// Where parsed documents go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
    /// One `<stem>.json` per input.
    Dir(PathBuf),
}

impl OutputTarget {
    pub fn resolve(output: Option<&Path>, input_count: usize) -> Self {
        match output {
            None => OutputTarget::Stdout,
            Some(path) if path.is_dir() => OutputTarget::Dir(path.to_path_buf()),
            Some(path) if input_count > 1 && path.extension().is_none() => {
                OutputTarget::Dir(path.to_path_buf())
            }
            Some(path) => OutputTarget::File(path.to_path_buf()),
        }
    }

    pub fn destination(&self, input: &Path) -> Option<PathBuf> {
        match self {
            OutputTarget::Stdout => None,
            OutputTarget::File(path) => Some(path.clone()),
            OutputTarget::Dir(dir) => {
                let stem = input
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "document".to_string());
                Some(dir.join(format!("{}.json", stem)))
            }
        }
    }

    /// Write one document; returns the file written, if any.
    pub fn write(
        &self,
        input: &Path,
        doc: &ContractDocument,
        compact: bool,
    ) -> InputResult<Option<PathBuf>> {
        let Some(dest) = self.destination(input) else {
            let json = to_json(doc, compact).map_err(|source| InputError::Json {
                path: input.to_path_buf(),
                source,
            })?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json).map_err(|source| InputError::Write {
                path: PathBuf::from("<stdout>"),
                source,
            })?;
            return Ok(None);
        };

        let json = to_json(doc, compact).map_err(|source| InputError::Json {
            path: dest.clone(),
            source,
        })?;
        let write_err = |source: std::io::Error| InputError::Write {
            path: dest.clone(),
            source,
        };
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&dest, json).map_err(write_err)?;
        info!("Written: {}", dest.display());
        Ok(Some(dest))
    }
}

// ── Tests ──
