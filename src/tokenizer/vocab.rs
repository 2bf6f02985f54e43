// src/tokenizer/vocab.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};
use rustc_hash::FxHashMap as HashMap;

use crate::tokenizer::{Error, Result};

/// Surface forms admitted in the output, with the counts they were learned with.
///
/// Word-internal units are stored with the continuation marker appended
/// (`lo@@`), word-final units bare (`lower`). Only key presence matters when
/// segmenting.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    counts: HashMap<String, u64>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counts<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self {
            counts: entries.into_iter().map(|(form, c)| (form.into(), c)).collect(),
        }
    }

    /// Parses `form count` lines. Blank lines are skipped.
    pub fn from_lines<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = Self::new();
        for (idx, line) in lines.into_iter().enumerate() {
            vocab.push_line(idx + 1, line.as_ref())?;
        }
        Ok(vocab)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut vocab = Self::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| Error::io("<vocabulary>", e))?;
            vocab.push_line(idx + 1, &line)?;
        }
        Ok(vocab)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let vocab = Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            Error::Io { source, .. } => Error::io(path, source),
            other => other,
        })?;
        info!("loaded {} vocabulary entries from {}", vocab.len(), path.display());
        Ok(vocab)
    }

    fn push_line(&mut self, line_no: usize, line: &str) -> Result<()> {
        if line.trim().is_empty() {
            return Ok(());
        }
        let malformed = || Error::MalformedVocabEntry {
            line: line_no,
            content: line.to_string(),
        };
        let mut fields = line.split_whitespace();
        let (form, count) = match (fields.next(), fields.next(), fields.next()) {
            (Some(form), Some(count), None) => (form, count),
            _ => return Err(malformed()),
        };
        let count = count.parse::<u64>().map_err(|_| malformed())?;
        if self.counts.insert(form.to_string(), count).is_some() {
            warn!("duplicate vocabulary entry {form:?} at line {line_no}");
        }
        Ok(())
    }

    #[inline]
    pub fn contains(&self, form: &str) -> bool {
        self.counts.contains_key(form)
    }

    pub fn count(&self, form: &str) -> Option<u64> {
        self.counts.get(form).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
