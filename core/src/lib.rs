//! Retrieval core for the Cranfield collection: parse the flat-file corpus,
//! normalize text, fit a TF-IDF index, and answer cosine-similarity searches and
//! document lookups from an immutable [`IndexContext`].

pub mod builder;
pub mod context;
pub mod error;
pub mod eval;
pub mod index;
pub mod matrix;
pub mod parser;
pub mod persist;
pub mod search;
pub mod tokenizer;
pub mod vectorizer;

pub use context::IndexContext;
pub use error::{Error, Result};
pub use index::*;
pub use vectorizer::{TfidfVectorizer, VectorizerConfig};
