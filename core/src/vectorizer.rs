//! TF-IDF vectorizer over pre-normalized text.
//!
//! Input strings are already space-joined base forms, so the analyzer only splits
//! on whitespace and drops single-character tokens. Weights are raw term counts
//! times a smoothed idf, `ln((1 + n) / (1 + df)) + 1`, and every vector is
//! L2-normalized.

use crate::error::{Error, Result};
use crate::index::TermId;
use crate::matrix::{CsrMatrix, SparseVector};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in.
    pub max_df: f64,
    pub min_token_len: usize,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self { min_df: 5, max_df: 0.95, min_token_len: 2 }
    }
}

impl VectorizerConfig {
    fn validate(&self, num_docs: usize) -> Result<usize> {
        if self.min_df < 1 {
            return Err(Error::Configuration("min_df must be at least 1".into()));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(Error::Configuration(format!("max_df must be in (0, 1], got {}", self.max_df)));
        }
        let max_doc_count = (self.max_df * num_docs as f64).floor() as usize;
        if max_doc_count < self.min_df {
            return Err(Error::Configuration(format!(
                "max_df={} allows at most {max_doc_count} documents per term, fewer than min_df={}",
                self.max_df, self.min_df
            )));
        }
        Ok(max_doc_count)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    pub config: VectorizerConfig,
    vocabulary: HashMap<String, TermId>,
    idf: Vec<f32>,
    num_docs: usize,
}

impl TfidfVectorizer {
    fn analyze<'a>(&self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        analyze(text, self.config.min_token_len)
    }

    /// Learn the vocabulary and idf weights from `corpus`.
    pub fn fit<S: AsRef<str>>(corpus: &[S], config: VectorizerConfig) -> Result<Self> {
        if corpus.is_empty() {
            return Err(Error::Configuration("cannot fit a vectorizer on an empty corpus".into()));
        }
        let num_docs = corpus.len();
        let max_doc_count = config.validate(num_docs)?;

        let mut df: HashMap<&str, usize> = HashMap::new();
        for text in corpus {
            let seen: HashSet<&str> = analyze(text.as_ref(), config.min_token_len).collect();
            for term in seen {
                *df.entry(term).or_insert(0) += 1;
            }
        }
        let total_terms = df.len();

        // BTreeMap keeps column assignment independent of hash order.
        let kept: BTreeMap<&str, usize> = df
            .into_iter()
            .filter(|(_, count)| *count >= config.min_df && *count <= max_doc_count)
            .collect();
        if kept.is_empty() {
            return Err(Error::Configuration(format!(
                "no terms remain after pruning {total_terms} terms with min_df={} max_df={}",
                config.min_df, config.max_df
            )));
        }

        let n = num_docs as f64;
        let mut vocabulary = HashMap::with_capacity(kept.len());
        let mut idf = Vec::with_capacity(kept.len());
        for (col, (term, count)) in kept.into_iter().enumerate() {
            vocabulary.insert(term.to_string(), col as TermId);
            idf.push((((1.0 + n) / (1.0 + count as f64)).ln() + 1.0) as f32);
        }
        tracing::info!(num_docs, total_terms, vocab_size = vocabulary.len(), "fitted tf-idf vocabulary");
        Ok(Self { config, vocabulary, idf, num_docs })
    }

    /// Project one text into the fitted space. Unknown terms are ignored.
    pub fn transform_one(&self, text: &str) -> SparseVector {
        let mut tf: HashMap<TermId, u32> = HashMap::new();
        for term in self.analyze(text) {
            if let Some(&col) = self.vocabulary.get(term) {
                *tf.entry(col).or_insert(0) += 1;
            }
        }
        let entries = tf
            .into_iter()
            .map(|(col, count)| (col, count as f32 * self.idf[col as usize]))
            .collect();
        let mut v = SparseVector::from_entries(entries);
        v.l2_normalize();
        v
    }

    pub fn transform<S: AsRef<str>>(&self, corpus: &[S]) -> CsrMatrix {
        let mut matrix = CsrMatrix::new(self.vocab_size());
        for text in corpus {
            matrix.push_row(&self.transform_one(text.as_ref()));
        }
        matrix
    }

    pub fn fit_transform<S: AsRef<str>>(corpus: &[S], config: VectorizerConfig) -> Result<(Self, CsrMatrix)> {
        let vectorizer = Self::fit(corpus, config)?;
        let matrix = vectorizer.transform(corpus);
        Ok((vectorizer, matrix))
    }

    pub fn vocab_size(&self) -> usize {
        self.idf.len()
    }

    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.term_id(term).map(|col| self.idf[col as usize])
    }

    pub fn is_consistent(&self) -> bool {
        self.vocabulary.len() == self.idf.len()
            && self.vocabulary.values().all(|col| (*col as usize) < self.idf.len())
    }
}

fn analyze(text: &str, min_len: usize) -> impl Iterator<Item = &str> {
    text.split_whitespace().filter(move |t| t.chars().count() >= min_len)
}
