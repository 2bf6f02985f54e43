use std::fs;
use std::path::PathBuf;

use fastbpe::{BPE, BpeBuilder, Config, Error};
use tempfile::TempDir;

const CODES: &str = "l o 120\nlo w 80\ne r</w> 60\nlow er</w> 10\nt h 50\nth e</w> 45\n";
const VOCAB: &str = "lo@@ 100\nw@@ 40\ner 30\nthe 200\nth@@ 12\n";

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_and_apply_from_files() {
    let dir = TempDir::new().unwrap();
    let codes = write(&dir, "codes", CODES);
    let vocab = write(&dir, "vocab.txt", VOCAB);

    let bpe = BPE::from_files(&codes, Some(&vocab)).unwrap();
    assert_eq!(bpe.merges().len(), 6);
    assert_eq!(bpe.vocab().map(|v| v.len()), Some(5));

    // "lower" merges fully, then backs off to lo + w + er
    assert_eq!(bpe.apply("lower"), "lo@@ w@@ er");
    assert_eq!(bpe.apply("the"), "the");
    assert_eq!(bpe.apply("then"), "th@@ e@@ n");
}

#[test]
fn test_apply_without_vocabulary_file() {
    let dir = TempDir::new().unwrap();
    let codes = write(&dir, "codes", CODES);

    let bpe = BPE::from_files(&codes, None::<PathBuf>).unwrap();
    assert!(bpe.vocab().is_none());
    assert_eq!(bpe.apply("lower"), "lower");
    assert_eq!(bpe.apply("lowest"), "low@@ e@@ s@@ t");
}

#[test]
fn test_apply_sentences_end_to_end() {
    let dir = TempDir::new().unwrap();
    let codes = write(&dir, "codes", CODES);
    let vocab = write(&dir, "vocab.txt", VOCAB);
    let bpe = BpeBuilder::new().codes(&codes).vocab(&vocab).build().unwrap();

    let out = bpe.apply_sentences(&["the lower", "the"]);
    assert_eq!(out, vec![vec!["the", "lo@@ w@@ er"], vec!["the"]]);
}

#[test]
fn test_builder_from_json_config() {
    let dir = TempDir::new().unwrap();
    let codes = write(&dir, "codes", "c a\nca t</w>\n");
    let vocab = write(&dir, "vocab.txt", "ca## 3\n");
    let config = format!(
        r###"{{"codes": {:?}, "vocab": {:?}, "continuation_marker": "##", "parallel": false}}"###,
        codes.display().to_string(),
        vocab.display().to_string()
    );
    let config_path = write(&dir, "config.json", &config);

    let config = Config::from_file(&config_path).unwrap();
    assert!(!config.parallel);
    let bpe = BpeBuilder::from_config(config).build().unwrap();
    assert_eq!(bpe.continuation_marker(), "##");
    assert_eq!(bpe.apply("cat"), "ca## t");
}

#[test]
fn test_missing_files_fail_construction() {
    let dir = TempDir::new().unwrap();
    let codes = write(&dir, "codes", CODES);

    let err = BPE::from_files(dir.path().join("nope"), None::<PathBuf>).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));

    let err = BPE::from_files(&codes, Some(dir.path().join("nope"))).unwrap_err();
    match err {
        Error::Io { path, .. } => assert!(path.ends_with("nope")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_malformed_files_fail_construction() {
    let dir = TempDir::new().unwrap();
    let codes = write(&dir, "codes", "l o\nlo\n");
    let err = BPE::from_files(&codes, None::<PathBuf>).unwrap_err();
    assert!(matches!(err, Error::MalformedMergeRule { line: 2, .. }));

    let codes = write(&dir, "codes_ok", CODES);
    let vocab = write(&dir, "vocab.txt", "lo@@ 100\nw@@\n");
    let err = BPE::from_files(&codes, Some(&vocab)).unwrap_err();
    assert!(matches!(err, Error::MalformedVocabEntry { line: 2, .. }));
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn test_bad_config_json() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "config.json", "{ not json");
    assert!(matches!(Config::from_file(&path), Err(Error::Json(_))));
}

#[test]
fn test_segment_every_unit_is_admissible_or_irreducible() {
    let dir = TempDir::new().unwrap();
    let codes = write(&dir, "codes", CODES);
    let vocab_path = write(&dir, "vocab.txt", VOCAB);
    let bpe = BPE::from_files(&codes, Some(&vocab_path)).unwrap();
    let vocab = bpe.vocab().unwrap();

    for word in ["lower", "lowest", "the", "other", "éther", "thé"] {
        let pieces = bpe.segment(word);
        assert_eq!(pieces.concat(), format!("{word}</w>"));
        let last = pieces.len() - 1;
        for (i, piece) in pieces.iter().enumerate() {
            let query = if i == last {
                piece.strip_suffix("</w>").unwrap().to_string()
            } else {
                format!("{piece}@@")
            };
            assert!(
                vocab.contains(&query) || bpe.merges().reverse(piece).is_none(),
                "{piece:?} in {word:?} is neither admissible nor irreducible"
            );
        }
    }
}
