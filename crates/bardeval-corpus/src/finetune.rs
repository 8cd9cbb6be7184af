//! Fine-tune training file builder
//!
//! Turns a directory of text chunks into a chat-format JSONL file: one line
//! per chunk, each a single assistant message holding the chunk text.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::CorpusError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// One training example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineTuneEntry {
    pub messages: Vec<ChatMessage>,
}

impl FineTuneEntry {
    /// Example consisting of a single assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage {
                role: "assistant".to_string(),
                content: content.into(),
            }],
        }
    }
}

/// A written training file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FineTuneFile {
    pub path: PathBuf,
    pub entries: usize,
    /// SHA-256 hex of the file bytes
    pub sha256: String,
}

/// Read every file in `dir` (sorted by name) as one entry.
pub fn collect_entries(dir: &Path) -> Result<Vec<FineTuneEntry>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| CorpusError::io(dir, e))? {
        let path = entry.map_err(|e| CorpusError::io(dir, e))?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(CorpusError::EmptyInput(dir.to_path_buf()));
    }
    files.sort();

    files
        .iter()
        .map(|path| {
            debug!("Reading {:?}", path);
            std::fs::read_to_string(path)
                .map(FineTuneEntry::assistant)
                .map_err(|e| CorpusError::io(path, e))
        })
        .collect()
}

/// Write entries as JSONL to `out`.
pub fn write_jsonl(entries: &[FineTuneEntry], out: &Path) -> Result<FineTuneFile> {
    let mut bytes = Vec::new();
    for entry in entries {
        serde_json::to_writer(&mut bytes, entry)?;
        bytes.push(b'\n');
    }

    let mut file = std::fs::File::create(out).map_err(|e| CorpusError::io(out, e))?;
    file.write_all(&bytes).map_err(|e| CorpusError::io(out, e))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);

    Ok(FineTuneFile {
        path: out.to_path_buf(),
        entries: entries.len(),
        sha256: hex::encode(hasher.finalize()),
    })
}

/// Build a training file from a directory of chunks.
pub fn build_jsonl(dir: &Path, out: &Path) -> Result<FineTuneFile> {
    let entries = collect_entries(dir)?;
    let file = write_jsonl(&entries, out)?;
    info!(
        "JSONL file {:?} has been written ({} entries)",
        file.path, file.entries
    );
    Ok(file)
}
