//! Automaton file format detection

use super::args::FileFormat;
use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// How an input file's format was decided
#[derive(Debug, Clone, Copy)]
pub struct FormatDetection {
    /// The format
    pub format: FileFormat,
    /// What decided it
    pub method: DetectionMethod,
}

/// What decided an input file's format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMethod {
    /// A gzip header; the extension picks bincode or JSON inside
    GzipHeader,
    /// The file extension
    Extension,
    /// The first bytes: `{` for JSON, a record name or comment for text
    Content,
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::GzipHeader => "gzip header",
            Self::Extension => "extension",
            Self::Content => "content",
        };
        f.write_str(name)
    }
}

/// Decide the format of an existing automaton file
pub fn detect_format(path: &Path) -> Result<FormatDetection> {
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut header = [0u8; 64];
    let bytes_read = file
        .read(&mut header)
        .with_context(|| format!("Failed to read file header: {}", path.display()))?;
    let header = &header[..bytes_read];

    if header.starts_with(&GZIP_MAGIC) {
        return Ok(FormatDetection {
            format: gzip_format(path)?,
            method: DetectionMethod::GzipHeader,
        });
    }

    if let Ok(format) = format_from_extension(path) {
        return Ok(FormatDetection {
            format,
            method: DetectionMethod::Extension,
        });
    }

    Ok(FormatDetection {
        format: format_from_content(header),
        method: DetectionMethod::Content,
    })
}

/// Format for writing to `path`: the user's choice, else the extension, else text
pub fn output_format(path: Option<&Path>, user_format: Option<FileFormat>) -> FileFormat {
    user_format
        .or_else(|| path.and_then(|p| format_from_extension(p).ok()))
        .unwrap_or(FileFormat::Text)
}

#[cfg(feature = "compression")]
fn gzip_format(path: &Path) -> Result<FileFormat> {
    let name = path.to_string_lossy().to_lowercase();
    Ok(if name.ends_with(".json.gz") {
        FileFormat::JsonGzip
    } else {
        FileFormat::BincodeGzip
    })
}

#[cfg(not(feature = "compression"))]
fn gzip_format(path: &Path) -> Result<FileFormat> {
    bail!(
        "{} is gzip-compressed; rebuild with the `compression` feature to read it",
        path.display()
    )
}

/// Detect format by file extension
fn format_from_extension(path: &Path) -> Result<FileFormat> {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .context("Invalid filename")?
        .to_lowercase();
    #[cfg(feature = "compression")]
    {
        if name.ends_with(".json.gz") {
            return Ok(FileFormat::JsonGzip);
        }
        if name.ends_with(".bin.gz") || name.ends_with(".gz") {
            return Ok(FileFormat::BincodeGzip);
        }
    }
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .context("No file extension")?;
    Ok(match ext.to_lowercase().as_str() {
        "fsa" | "txt" | "gap" | "g" => FileFormat::Text,
        "bin" | "bincode" => FileFormat::Bincode,
        "json" => FileFormat::Json,
        _ => bail!("Unknown file extension in {}", name),
    })
}

/// Detect format by analysing the first bytes of a file
fn format_from_content(header: &[u8]) -> FileFormat {
    let first = header.iter().find(|b| !b.is_ascii_whitespace());
    match first {
        Some(b'{') => FileFormat::Json,
        Some(&b) if b == b'#' || b == b'_' || b.is_ascii_alphabetic() => {
            let is_text = std::str::from_utf8(header).is_ok();
            if is_text {
                FileFormat::Text
            } else {
                FileFormat::Bincode
            }
        }
        _ => FileFormat::Bincode,
    }
}
