//! bardeval-corpus: training data preparation
//!
//! Splits a plain-text Shakespeare corpus (sonnets, plays, other verse) into
//! short chunks, then packs those chunks into a chat-format JSONL file for
//! fine-tuning.

mod error;
pub mod finetune;
pub mod split;

pub use error::CorpusError;
pub use finetune::{build_jsonl, collect_entries, write_jsonl, FineTuneEntry, FineTuneFile};
pub use split::{write_split, Chunk, CorpusKind, SplitInput, SplitSummary, Splitter};

/// Result type for corpus operations
pub type Result<T> = std::result::Result<T, CorpusError>;
