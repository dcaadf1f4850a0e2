//! Source file handle: the immutable input to one decode call.

use std::io::Read;
use std::path::Path;

/// An in-memory file awaiting classification and decode.
///
/// Owned by the caller; the ingestion layer never retains it past one
/// [`decode`](crate::decode) call.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// File name as presented by the caller (used for extension sniffing).
    pub name: String,
    /// Declared MIME type, possibly empty.
    pub mime: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// Wrap an already-resident buffer.
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk. MIME is left empty; classification falls back
    /// to the extension table, which is authoritative anyway.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let mut bytes = Vec::new();
        std::fs::File::open(path)?.read_to_end(&mut bytes)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            name,
            mime: String::new(),
            bytes,
        })
    }

    /// Declared byte length of the file.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
