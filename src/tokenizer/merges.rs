// src/tokenizer/merges.rs

//! Learned merge rules and their priority ranks.
//!
//! Ranks follow file order: the first rule gets rank 0 and is merged first.
//! The table also keeps a reverse index from a merged symbol back to the pair
//! that produced it, which the vocabulary back-off walks when splitting.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};
use rustc_hash::FxHashMap as HashMap;

use crate::tokenizer::{Error, Result};

pub type Rank = usize;

/// An ordered pair of adjacent symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolPair {
    pub left: String,
    pub right: String,
}

impl SymbolPair {
    pub fn new<L: Into<String>, R: Into<String>>(left: L, right: R) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// The symbol produced by merging this pair.
    pub fn merged(&self) -> String {
        [self.left.as_str(), self.right.as_str()].concat()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MergeTable {
    // left -> right -> rank, so lookups from borrowed pieces never allocate
    ranks: HashMap<String, HashMap<String, Rank>>,
    reversed: HashMap<String, SymbolPair>,
    len: usize,
}

impl MergeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from in-memory pairs, ranked in iteration order.
    pub fn from_pairs<I, L, R>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, R)>,
        L: Into<String>,
        R: Into<String>,
    {
        let mut table = Self::new();
        for (left, right) in pairs {
            table.push(SymbolPair::new(left, right));
        }
        table
    }

    /// Parses rule lines of the form `left right [count]`.
    ///
    /// Blank lines are skipped. Any other line that does not split into two or
    /// three fields, or whose third field is not a count, fails with the 1-based
    /// line number.
    pub fn from_lines<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for (idx, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }
            let pair = parse_rule(line).ok_or_else(|| Error::MalformedMergeRule {
                line: idx + 1,
                content: line.to_string(),
            })?;
            table.push(pair);
        }
        Ok(table)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut table = Self::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| Error::io("<merge rules>", e))?;
            if line.trim().is_empty() {
                continue;
            }
            let pair = parse_rule(&line).ok_or_else(|| Error::MalformedMergeRule {
                line: idx + 1,
                content: line.clone(),
            })?;
            table.push(pair);
        }
        Ok(table)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let table = Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            Error::Io { source, .. } => Error::io(path, source),
            other => other,
        })?;
        info!("loaded {} merge rules from {}", table.len(), path.display());
        Ok(table)
    }

    fn push(&mut self, pair: SymbolPair) {
        // an empty half would map a symbol back onto itself in the reverse index
        if pair.left.is_empty() || pair.right.is_empty() {
            warn!(
                "skipping merge rule ({:?}, {:?}) with an empty symbol",
                pair.left, pair.right
            );
            return;
        }
        let rank: Rank = self.len;
        let rights = self.ranks.entry(pair.left.clone()).or_default();
        if rights.contains_key(&pair.right) {
            warn!(
                "duplicate merge rule ({:?}, {:?}) keeps its first rank",
                pair.left, pair.right
            );
        } else {
            rights.insert(pair.right.clone(), rank);
            self.len += 1;
        }
        // A later rule with the same concatenation replaces the earlier one.
        self.reversed.insert(pair.merged(), pair);
    }

    /// Rank of the pair `(left, right)`, if it is a learned merge.
    #[inline]
    pub fn rank(&self, left: &str, right: &str) -> Option<Rank> {
        self.ranks.get(left).and_then(|rights| rights.get(right)).copied()
    }

    #[inline]
    pub fn get(&self, pair: &SymbolPair) -> Option<Rank> {
        self.rank(&pair.left, &pair.right)
    }

    /// The pair whose merge produced `merged`. Only the last rule producing a
    /// given concatenation is recoverable.
    #[inline]
    pub fn reverse(&self, merged: &str) -> Option<&SymbolPair> {
        self.reversed.get(merged)
    }

    /// Number of distinct pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn parse_rule(line: &str) -> Option<SymbolPair> {
    let mut fields = line.split_whitespace();
    let left = fields.next()?;
    let right = fields.next()?;
    if let Some(count) = fields.next() {
        count.parse::<u64>().ok()?;
    }
    if fields.next().is_some() {
        return None;
    }
    Some(SymbolPair::new(left, right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_follow_line_order() {
        let table = MergeTable::from_lines(["l o", "lo w", "e r</w>"]).unwrap();

        assert_eq!(table.rank("l", "o"), Some(0));
        assert_eq!(table.rank("lo", "w"), Some(1));
        assert_eq!(table.rank("e", "r</w>"), Some(2));
        assert_eq!(table.rank("e", "r"), None);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_get_by_pair() {
        let table = MergeTable::from_lines(["l o", "lo w"]).unwrap();

        assert_eq!(table.get(&SymbolPair::new("lo", "w")), Some(1));
        assert_eq!(table.get(&SymbolPair::new("l", "o")), Some(0));
        assert_eq!(table.get(&SymbolPair::new("o", "l")), None);
    }

    #[test]
    fn test_rank_matches_position_for_large_tables() {
        let pairs: Vec<(String, String)> = (0..5_000)
            .map(|i| (format!("a{i}"), format!("b{i}")))
            .collect();
        let table = MergeTable::from_pairs(pairs);

        assert_eq!(table.len(), 5_000);
        assert_eq!(table.rank("a0", "b0"), Some(0));
        assert_eq!(table.rank("a4999", "b4999"), Some(4_999));
    }

    #[test]
    fn test_empty_symbols_are_skipped() {
        let table = MergeTable::from_pairs([("", "a"), ("a", ""), ("a", "b")]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.rank("", "a"), None);
        assert_eq!(table.reverse("a"), None);
        assert_eq!(table.rank("a", "b"), Some(0));
    }

    #[test]
    fn test_reverse_lookup() {
        let table = MergeTable::from_pairs([("l", "o"), ("lo", "w")]);

        assert_eq!(table.reverse("low"), Some(&SymbolPair::new("lo", "w")));
        assert_eq!(table.reverse("lo"), Some(&SymbolPair::new("l", "o")));
        assert_eq!(table.reverse("l"), None);
    }

    #[test]
    fn test_reverse_lookup_last_write_wins() {
        let table = MergeTable::from_pairs([("a", "bc"), ("ab", "c")]);

        assert_eq!(table.reverse("abc"), Some(&SymbolPair::new("ab", "c")));
        // both forward entries survive
        assert_eq!(table.rank("a", "bc"), Some(0));
        assert_eq!(table.rank("ab", "c"), Some(1));
    }

    #[test]
    fn test_count_column_is_accepted() {
        let table = MergeTable::from_lines(["t h 5120", "th e</w> 4000"]).unwrap();
        assert_eq!(table.rank("t", "h"), Some(0));
        assert_eq!(table.rank("th", "e</w>"), Some(1));
    }

    #[test]
    fn test_blank_lines_do_not_take_a_rank() {
        let table = MergeTable::from_lines(["a b", "", "   ", "b c"]).unwrap();
        assert_eq!(table.rank("b", "c"), Some(1));
    }

    #[test]
    fn test_duplicate_pair_keeps_first_rank() {
        let table = MergeTable::from_lines(["a b", "c d", "a b", "e f"]).unwrap();
        assert_eq!(table.rank("a", "b"), Some(0));
        assert_eq!(table.rank("e", "f"), Some(2));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_malformed_rule_reports_line() {
        let err = MergeTable::from_lines(["a b", "c"]).unwrap_err();
        match err {
            Error::MalformedMergeRule { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "c");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = MergeTable::from_lines(["a b c d"]).unwrap_err();
        assert!(matches!(err, Error::MalformedMergeRule { line: 1, .. }));

        let err = MergeTable::from_lines(["a b many"]).unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_from_reader() {
        let data = "l o 10\nlo w 8\n";
        let table = MergeTable::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.rank("lo", "w"), Some(1));
    }
}
