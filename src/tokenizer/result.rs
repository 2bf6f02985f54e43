// src/tokenizer/result.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A table, config or input file could not be opened or read.
    #[error("I/O error for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A merge-rule line that is not `left right [count]`.
    #[error("malformed merge rule at line {line}: {content:?}")]
    MalformedMergeRule { line: usize, content: String },

    /// A vocabulary line that is not `form count`.
    #[error("malformed vocabulary entry at line {line}: {content:?}")]
    MalformedVocabEntry { line: usize, content: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the two "malformed input file" conditions.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Error::MalformedMergeRule { .. } | Error::MalformedVocabEntry { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
