//! Applies a learned byte-pair-encoding merge table to pre-tokenized text,
//! producing fastBPE-style subword units (`lo@@ w@@ er`).

pub mod tokenizer;

pub use tokenizer::{BPE, BpeBuilder, Config, Error, MergeTable, Result, Vocabulary};
