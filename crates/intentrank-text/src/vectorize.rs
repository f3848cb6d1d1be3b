//! Dual-granularity TF-IDF similarity.
//!
//! Two channels are fitted over `corpus + [query]` as one document set:
//! word n-grams over `[a-z0-9]+` tokens and word-boundary character n-grams.
//! Each channel uses raw counts, smoothed IDF `ln((1 + n) / (1 + df)) + 1`
//! and per-row L2 normalization. The similarity of a corpus document is the
//! dot product of its concatenated rows with the query's, i.e. the sum of
//! the two per-channel cosines. Channels are not rescaled against each other.
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static WORD_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("word token regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\s+").expect("whitespace regex"));

/// Inclusive n-gram length range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NgramRange {
    pub min: usize,
    pub max: usize,
}

impl NgramRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

/// Sparse, L2-normalized row keyed by term. `BTreeMap` keeps every float
/// reduction in a fixed order so scores are reproducible bit for bit.
type Row = BTreeMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalVectorizer {
    pub word: NgramRange,
    pub char: NgramRange,
}

impl LexicalVectorizer {
    /// Markup elements: word 1-2, char 3-4.
    pub const MARKUP: Self = Self { word: NgramRange::new(1, 2), char: NgramRange::new(3, 4) };
    /// Knowledge document chunks: word 1-3, char 3-5.
    pub const KNOWLEDGE: Self = Self { word: NgramRange::new(1, 3), char: NgramRange::new(3, 5) };

    pub fn new(word: NgramRange, char: NgramRange) -> Self {
        Self { word, char }
    }

    /// One similarity per corpus document. An empty corpus yields an empty
    /// list; a query without any terms yields all zeros.
    pub fn similarities(&self, corpus: &[String], query: &str) -> Vec<f64> {
        if corpus.is_empty() {
            return Vec::new();
        }
        let mut docs: Vec<String> = corpus.iter().map(|d| d.to_lowercase()).collect();
        docs.push(query.to_lowercase());

        let word_rows = fit(&docs, |d| word_ngrams(d, self.word));
        let char_rows = fit(&docs, |d| char_wb_ngrams(d, self.char));
        let (Some((word_query, word_docs)), Some((char_query, char_docs))) =
            (word_rows.split_last(), char_rows.split_last())
        else {
            return Vec::new();
        };

        word_docs
            .iter()
            .zip(char_docs)
            .map(|(w, c)| dot(word_query, w) + dot(char_query, c))
            .collect()
    }
}

fn fit<F>(docs: &[String], analyze: F) -> Vec<Row>
where
    F: Fn(&str) -> Vec<String>,
{
    let counts: Vec<BTreeMap<String, usize>> = docs
        .iter()
        .map(|d| {
            let mut tf = BTreeMap::new();
            for term in analyze(d.as_str()) {
                *tf.entry(term).or_insert(0) += 1;
            }
            tf
        })
        .collect();

    let mut df: BTreeMap<&str, usize> = BTreeMap::new();
    for tf in &counts {
        for term in tf.keys() {
            *df.entry(term.as_str()).or_insert(0) += 1;
        }
    }

    let n = docs.len() as f64;
    counts
        .iter()
        .map(|tf| {
            let mut row: Row = tf
                .iter()
                .map(|(term, &count)| {
                    let doc_freq = df.get(term.as_str()).copied().unwrap_or(0) as f64;
                    let idf = ((1.0 + n) / (1.0 + doc_freq)).ln() + 1.0;
                    (term.clone(), count as f64 * idf)
                })
                .collect();
            let norm = row.values().map(|w| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                row.values_mut().for_each(|w| *w /= norm);
            }
            row
        })
        .collect()
}

fn dot(a: &Row, b: &Row) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(term, w)| large.get(term).map(|v| w * v))
        .fold(0.0, |acc, x| acc + x)
}

/// Word n-grams over `[a-z0-9]+` tokens of already-lowercased text.
pub fn word_ngrams(text: &str, range: NgramRange) -> Vec<String> {
    let tokens: Vec<&str> = WORD_TOKEN.find_iter(text).map(|m| m.as_str()).collect();
    let mut grams = Vec::new();
    for n in range.min.max(1)..=range.max {
        if n > tokens.len() {
            break;
        }
        grams.extend(tokens.windows(n).map(|w| w.join(" ")));
    }
    grams
}

/// Character n-grams that never cross a word boundary. Each word is padded
/// with one space on both sides; a padded word no longer than `n` is emitted
/// once whole and longer windows are skipped for it.
pub fn char_wb_ngrams(text: &str, range: NgramRange) -> Vec<String> {
    let text = WHITESPACE_RUN.replace_all(text, " ");
    let mut grams = Vec::new();
    for word in text.split_whitespace() {
        let padded: Vec<char> = std::iter::once(' ').chain(word.chars()).chain(std::iter::once(' ')).collect();
        for n in range.min.max(1)..=range.max {
            if padded.len() <= n {
                grams.push(padded.iter().collect());
                break;
            }
            grams.extend(padded.windows(n).map(|w| w.iter().collect::<String>()));
        }
    }
    grams
}
