// src/tokenizer/config.rs

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::tokenizer::bpe::BPE;
use crate::tokenizer::merges::MergeTable;
use crate::tokenizer::vocab::Vocabulary;
use crate::tokenizer::{Error, Result};

pub const DEFAULT_CONTINUATION_MARKER: &str = "@@";
pub const DEFAULT_END_OF_WORD_SUFFIX: &str = "</w>";

/// Where the tables live and how pieces are spelled.
///
/// Readable from JSON, e.g.
/// `{"codes": "codes.txt", "vocab": "vocab.txt", "parallel": false}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub codes: Option<PathBuf>,
    pub vocab: Option<PathBuf>,
    pub continuation_marker: String,
    pub end_of_word_suffix: String,
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            codes: None,
            vocab: None,
            continuation_marker: DEFAULT_CONTINUATION_MARKER.to_string(),
            end_of_word_suffix: DEFAULT_END_OF_WORD_SUFFIX.to_string(),
            parallel: true,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.continuation_marker.is_empty() {
            return Err(Error::InvalidConfig(
                "continuation marker must not be empty".into(),
            ));
        }
        if self.end_of_word_suffix.is_empty() {
            return Err(Error::InvalidConfig(
                "end-of-word suffix must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct BpeBuilder {
    config: Config,
}

impl BpeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn codes<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.codes = Some(path.into());
        self
    }

    #[must_use]
    pub fn vocab<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.vocab = Some(path.into());
        self
    }

    #[must_use]
    pub fn continuation_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.config.continuation_marker = marker.into();
        self
    }

    #[must_use]
    pub fn end_of_word_suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.config.end_of_word_suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Loads the tables named by the configuration. Fails on the first
    /// unreadable file or malformed line.
    pub fn build(self) -> Result<BPE> {
        self.config.validate()?;
        let codes = self
            .config
            .codes
            .as_ref()
            .ok_or_else(|| Error::InvalidConfig("no merge-rule file given".into()))?;
        let merges = MergeTable::from_file(codes)?;
        let vocab = match &self.config.vocab {
            Some(path) => Some(Vocabulary::from_file(path)?),
            None => None,
        };
        Ok(BPE::with_config(merges, vocab, &self.config))
    }
}
