// src/tokenizer/mod.rs

pub mod bpe;
pub mod config;
pub mod decompose;
pub mod final_flag;
pub mod merges;
pub mod pre_tokenizer;
pub mod progress;
pub mod result;
pub mod vocab;
pub mod word;

pub use bpe::BPE;
pub use config::{BpeBuilder, Config};
pub use decompose::Decomposer;
pub use final_flag::{FinalFlag, WithFinalFlag};
pub use merges::{MergeTable, Rank, SymbolPair};
pub use pre_tokenizer::{PreTokenizer, Whitespace};
pub use result::{Error, Result};
pub use vocab::Vocabulary;
pub use word::Word;
