// src/tokenizer/word.rs

use crate::tokenizer::merges::{MergeTable, Rank, SymbolPair};

/// A word being segmented, stored as its current sequence of pieces.
///
/// Pieces start out one per codepoint; the last one carries the end-of-word
/// suffix so that word-final merges are learned and applied separately.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Word {
    pieces: Vec<String>,
}

impl Word {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits `token` at codepoint boundaries and appends `end_of_word` to the
    /// final piece. An empty token gives an empty word.
    pub fn from_token(token: &str, end_of_word: &str) -> Self {
        let mut word = Self::new();
        if token.is_empty() {
            return word;
        }
        let mut last_start = 0;
        for (pos, byte) in token.bytes().enumerate() {
            // continuation bytes look like 0b10xx_xxxx and never start a piece
            if pos > 0 && byte & 0xC0 != 0x80 {
                word.add(token[last_start..pos].to_string());
                last_start = pos;
            }
        }
        word.add([&token[last_start..], end_of_word].concat());
        word
    }

    pub fn add(&mut self, piece: String) {
        self.pieces.push(piece);
    }

    pub fn pieces(&self) -> &[String] {
        &self.pieces
    }

    pub fn into_pieces(self) -> Vec<String> {
        self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Leftmost adjacent pair with the smallest rank, with its position.
    pub fn best_pair(&self, merges: &MergeTable) -> Option<(usize, Rank)> {
        let mut best: Option<(usize, Rank)> = None;
        for (i, window) in self.pieces.windows(2).enumerate() {
            if let Some(rank) = merges.rank(&window[0], &window[1]) {
                if best.is_none_or(|(_, best_rank)| rank < best_rank) {
                    best = Some((i, rank));
                }
            }
        }
        best
    }

    /// One left-to-right pass replacing every non-overlapping occurrence of
    /// `left right` by its concatenation. Returns how many merges happened.
    ///
    /// A piece consumed as the right side of a merge is not reused, so
    /// `a a a` under `a a` becomes `aa a`.
    pub fn merge(&mut self, left: &str, right: &str) -> usize {
        let old = std::mem::take(&mut self.pieces);
        self.pieces.reserve(old.len());
        let mut merged = 0;
        let mut iter = old.into_iter().peekable();
        while let Some(mut piece) = iter.next() {
            if piece == left {
                if let Some(next) = iter.next_if(|next| next == right) {
                    piece.push_str(&next);
                    merged += 1;
                }
            }
            self.pieces.push(piece);
        }
        merged
    }

    /// Greedy merge loop: repeatedly applies the best-ranked adjacent pair
    /// until no adjacent pair is a learned merge.
    pub fn merge_all(&mut self, merges: &MergeTable) {
        while self.pieces.len() > 1 {
            let Some((i, _)) = self.best_pair(merges) else {
                break;
            };
            let pair = SymbolPair::new(self.pieces[i].clone(), self.pieces[i + 1].clone());
            self.merge(&pair.left, &pair.right);
        }
    }
}
