// src/tokenizer/decompose.rs

//! Vocabulary back-off.
//!
//! A merged piece whose surface form is not in the vocabulary is split back
//! into the pair that produced it, and each half is checked again. Splitting
//! stops at a piece that is admissible or that no rule produced (an original
//! codepoint), which is emitted even when the vocabulary lacks it.

use crate::tokenizer::final_flag::WithFinalFlag;
use crate::tokenizer::merges::MergeTable;
use crate::tokenizer::vocab::Vocabulary;

pub struct Decomposer<'a> {
    merges: &'a MergeTable,
    vocab: &'a Vocabulary,
    continuation_marker: &'a str,
    end_of_word: &'a str,
}

impl<'a> Decomposer<'a> {
    pub fn new(
        merges: &'a MergeTable,
        vocab: &'a Vocabulary,
        continuation_marker: &'a str,
        end_of_word: &'a str,
    ) -> Self {
        Self {
            merges,
            vocab,
            continuation_marker,
            end_of_word,
        }
    }

    /// Whether `piece` may be emitted as is at a final or non-final position.
    ///
    /// Final pieces are looked up without their end-of-word suffix, the others
    /// with the continuation marker appended.
    pub fn is_admissible(&self, piece: &str, is_final: bool) -> bool {
        if is_final {
            let bare = piece.strip_suffix(self.end_of_word).unwrap_or(piece);
            self.vocab.contains(bare)
        } else {
            let mut query = String::with_capacity(piece.len() + self.continuation_marker.len());
            query.push_str(piece);
            query.push_str(self.continuation_marker);
            self.vocab.contains(&query)
        }
    }

    /// Restricts a merged word to vocabulary units, preserving order.
    pub fn limit_vocab(&self, pieces: Vec<String>) -> Vec<String> {
        let mut out = Vec::with_capacity(pieces.len());
        for (is_final, piece) in pieces.into_iter().with_final_flag() {
            if self.is_admissible(&piece, is_final) {
                out.push(piece);
            } else {
                self.decompose(piece, is_final, &mut out);
            }
        }
        out
    }

    /// Splits `piece` along its merge history, appending the admissible or
    /// irreducible fragments to `out` from left to right.
    ///
    /// Only the rightmost fragment inherits `is_final`; a left half never ends
    /// the word. The walk uses an explicit stack so long merge chains cannot
    /// exhaust the call stack.
    pub fn decompose(&self, piece: String, is_final: bool, out: &mut Vec<String>) {
        let mut stack = vec![(piece, is_final, false)];
        while let Some((piece, is_final, checked)) = stack.pop() {
            if checked && self.is_admissible(&piece, is_final) {
                out.push(piece);
                continue;
            }
            match self.merges.reverse(&piece) {
                Some(pair) => {
                    // right half is pushed first so the left half comes out first
                    stack.push((pair.right.clone(), is_final, true));
                    stack.push((pair.left.clone(), false, true));
                }
                None => out.push(piece),
            }
        }
    }
}
