// src/tokenizer/bpe.rs

use std::path::Path;

use log::debug;
use rayon_cond::CondIterator;
use rustc_hash::FxHashMap as HashMap;

use crate::tokenizer::config::{BpeBuilder, Config};
use crate::tokenizer::decompose::Decomposer;
use crate::tokenizer::final_flag::WithFinalFlag;
use crate::tokenizer::merges::MergeTable;
use crate::tokenizer::pre_tokenizer::{PreTokenizer, Whitespace};
use crate::tokenizer::vocab::Vocabulary;
use crate::tokenizer::word::Word;
use crate::tokenizer::Result;

/// Applies a learned merge table to words, optionally restricted to a
/// vocabulary.
///
/// The tables are read-only once built, so a `BPE` can be shared by reference
/// across threads.
#[derive(Debug, Clone)]
pub struct BPE {
    merges: MergeTable,
    vocab: Option<Vocabulary>,
    continuation_marker: String,
    end_of_word: String,
    parallel: bool,
}

impl BPE {
    pub fn builder() -> BpeBuilder {
        BpeBuilder::new()
    }

    /// Builds from in-memory tables with the default `@@` and `</w>` markers.
    pub fn from_tables(merges: MergeTable, vocab: Option<Vocabulary>) -> Self {
        Self::with_config(merges, vocab, &Config::default())
    }

    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(codes: P, vocab: Option<Q>) -> Result<Self> {
        let mut builder = BpeBuilder::new().codes(codes.as_ref());
        if let Some(vocab) = vocab {
            builder = builder.vocab(vocab.as_ref());
        }
        builder.build()
    }

    pub(crate) fn with_config(merges: MergeTable, vocab: Option<Vocabulary>, config: &Config) -> Self {
        Self {
            merges,
            vocab,
            continuation_marker: config.continuation_marker.clone(),
            end_of_word: config.end_of_word_suffix.clone(),
            parallel: config.parallel,
        }
    }

    /// Whether batches are segmented on the rayon pool.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn merges(&self) -> &MergeTable {
        &self.merges
    }

    pub fn vocab(&self) -> Option<&Vocabulary> {
        self.vocab.as_ref()
    }

    pub fn continuation_marker(&self) -> &str {
        &self.continuation_marker
    }

    pub fn end_of_word_suffix(&self) -> &str {
        &self.end_of_word
    }

    /// Subword pieces of `word` after merging and vocabulary back-off. The
    /// last piece still carries the end-of-word suffix.
    pub fn segment(&self, word: &str) -> Vec<String> {
        let mut word = Word::from_token(word, &self.end_of_word);
        word.merge_all(&self.merges);
        let pieces = word.into_pieces();
        match &self.vocab {
            Some(vocab) => Decomposer::new(
                &self.merges,
                vocab,
                &self.continuation_marker,
                &self.end_of_word,
            )
            .limit_vocab(pieces),
            None => pieces,
        }
    }

    /// Segments one word into its serialized form, e.g. `lo@@ w@@ er`.
    /// An empty word gives an empty string.
    pub fn apply(&self, word: &str) -> String {
        let pieces = self.segment(word);
        self.serialize(&pieces)
    }

    /// Joins pieces: each non-final one is followed by the continuation marker
    /// and a space, the final one is written without its end-of-word suffix.
    fn serialize(&self, pieces: &[String]) -> String {
        let len = pieces
            .iter()
            .map(|p| p.len() + self.continuation_marker.len() + 1)
            .sum();
        let mut out = String::with_capacity(len);
        for (is_final, piece) in pieces.iter().with_final_flag() {
            if is_final {
                out.push_str(
                    piece
                        .strip_suffix(self.end_of_word.as_str())
                        .unwrap_or(piece.as_str()),
                );
            } else {
                out.push_str(piece);
                out.push_str(&self.continuation_marker);
                out.push(' ');
            }
        }
        out
    }

    /// Segments every word of one pre-tokenized sentence.
    pub fn apply_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        tokens.iter().map(|t| self.apply(t.as_ref())).collect()
    }

    /// Segments pre-tokenized sentences, keeping sentence and word order.
    ///
    /// Every distinct word is segmented once per call; with `parallel` set
    /// the distinct words are spread over the rayon pool.
    pub fn apply_batch<S: AsRef<str> + Sync>(&self, sentences: &[Vec<S>]) -> Vec<Vec<String>> {
        let mut unique: Vec<&str> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::default();
        let ids: Vec<Vec<usize>> = sentences
            .iter()
            .map(|sentence| {
                sentence
                    .iter()
                    .map(|word| {
                        let word = word.as_ref();
                        *index.entry(word).or_insert_with(|| {
                            unique.push(word);
                            unique.len() - 1
                        })
                    })
                    .collect()
            })
            .collect();

        debug!(
            "segmenting {} sentences, {} words, {} unique",
            sentences.len(),
            ids.iter().map(Vec::len).sum::<usize>(),
            unique.len()
        );

        let segmented: Vec<String> = CondIterator::new(&unique, self.parallel)
            .map(|word| self.apply(word))
            .collect();

        ids.into_iter()
            .map(|sentence| sentence.into_iter().map(|id| segmented[id].clone()).collect())
            .collect()
    }

    /// Splits raw sentences on whitespace and segments them.
    pub fn apply_sentences<S: AsRef<str> + Sync>(&self, sentences: &[S]) -> Vec<Vec<String>> {
        self.apply_sentences_with(&Whitespace, sentences)
    }

    pub fn apply_sentences_with<P, S>(&self, pre_tokenizer: &P, sentences: &[S]) -> Vec<Vec<String>>
    where
        P: PreTokenizer,
        S: AsRef<str> + Sync,
    {
        let tokenized: Vec<Vec<&str>> = sentences
            .iter()
            .map(|s| pre_tokenizer.pre_tokenize(s.as_ref()))
            .collect();
        self.apply_batch(&tokenized)
    }
}
