//! Corpus splitter
//!
//! Cuts a plain-text corpus into short training chunks. Each corpus kind has
//! its own boundary pattern; a boundary line opens a new chunk and is part
//! of it. Blank lines are never written, and chunks with fewer than two
//! lines are discarded so their number is reused by the next chunk.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::CorpusError;
use crate::Result;

/// Chunks shorter than this are dropped
const MIN_CHUNK_LINES: usize = 2;

/// Kind of corpus, which decides where chunks start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorpusKind {
    /// Split on an indented sonnet number
    Sonnets,
    /// Split on scene headings (`SCENE I` .. `SCENE V`)
    Plays,
    /// Split on stanza breaks
    Verse,
}

impl CorpusKind {
    /// File name prefix for chunks of this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            CorpusKind::Sonnets => "s",
            CorpusKind::Plays => "p",
            CorpusKind::Verse => "v",
        }
    }

    pub fn boundary_pattern(&self) -> &'static str {
        match self {
            CorpusKind::Sonnets => r"^\s+\d",
            CorpusKind::Plays => r"^SCENE [IV]",
            CorpusKind::Verse => r"^$",
        }
    }
}

/// One output chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// File name, e.g. `s12`
    pub name: String,
    pub lines: Vec<String>,
}

impl Chunk {
    /// File contents: each line newline-terminated
    pub fn text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

/// Splits text of one corpus kind
pub struct Splitter {
    kind: CorpusKind,
    boundary: Regex,
}

impl Splitter {
    pub fn new(kind: CorpusKind) -> Result<Self> {
        Ok(Splitter {
            kind,
            boundary: Regex::new(kind.boundary_pattern())?,
        })
    }

    pub fn kind(&self) -> CorpusKind {
        self.kind
    }

    /// Split `text` into numbered chunks.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current: Vec<String> = Vec::new();

        for line in text.lines() {
            if self.boundary.is_match(line) {
                self.flush(&mut chunks, &mut current);
            }
            if line.is_empty() {
                continue;
            }
            current.push(line.to_string());
        }
        self.flush(&mut chunks, &mut current);

        chunks
    }

    fn flush(&self, chunks: &mut Vec<Chunk>, current: &mut Vec<String>) {
        if current.len() >= MIN_CHUNK_LINES {
            chunks.push(Chunk {
                name: format!("{}{}", self.kind.prefix(), chunks.len()),
                lines: std::mem::take(current),
            });
        } else {
            current.clear();
        }
    }
}

/// One corpus file to split
#[derive(Debug, Clone)]
pub struct SplitInput {
    pub kind: CorpusKind,
    pub path: PathBuf,
}

impl SplitInput {
    pub fn new(kind: CorpusKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// Chunks written per corpus kind
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SplitSummary {
    pub out_dir: PathBuf,
    pub counts: Vec<(CorpusKind, usize)>,
}

impl SplitSummary {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

/// Split every input into `out_dir`.
///
/// `out_dir` is removed and recreated first so the output never mixes with
/// a previous split.
pub fn write_split(out_dir: &Path, inputs: &[SplitInput]) -> Result<SplitSummary> {
    if out_dir.exists() {
        std::fs::remove_dir_all(out_dir).map_err(|e| CorpusError::io(out_dir, e))?;
    }
    std::fs::create_dir_all(out_dir).map_err(|e| CorpusError::io(out_dir, e))?;

    let mut summary = SplitSummary {
        out_dir: out_dir.to_path_buf(),
        counts: Vec::new(),
    };

    for input in inputs {
        let text = std::fs::read_to_string(&input.path)
            .map_err(|e| CorpusError::io(&input.path, e))?;
        let chunks = Splitter::new(input.kind)?.split(&text);

        for chunk in &chunks {
            let path = out_dir.join(&chunk.name);
            debug!("Writing {:?} ({} lines)", path, chunk.lines.len());
            std::fs::write(&path, chunk.text()).map_err(|e| CorpusError::io(&path, e))?;
        }

        info!(
            "Split {:?} into {} {:?} chunk(s)",
            input.path,
            chunks.len(),
            input.kind
        );
        summary.counts.push((input.kind, chunks.len()));
    }

    Ok(summary)
}
