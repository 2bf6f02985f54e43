// src/tokenizer/pre_tokenizer.rs

use std::sync::LazyLock;
use regex::Regex;

// Static pattern; failing to compile it is a programming error.
pub static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+").unwrap());

/// Splits a raw sentence into the words handed to the segmenter.
pub trait PreTokenizer {
    fn pre_tokenize<'s>(&self, sentence: &'s str) -> Vec<&'s str>;
}

/// Splits on runs of Unicode whitespace and drops empty words.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Whitespace;

impl Whitespace {
    pub fn new() -> Self {
        Whitespace
    }
}

impl PreTokenizer for Whitespace {
    fn pre_tokenize<'s>(&self, sentence: &'s str) -> Vec<&'s str> {
        RE.find_iter(sentence).map(|m| m.as_str()).collect()
    }
}
