//! Event persistence
//!
//! - [`JsonlEventJournal`] - one JSON object per core event

mod jsonl_journal;

pub use jsonl_journal::JsonlEventJournal;
