use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type TermId = u32;
/// Row position of a document in the document-term matrix.
pub type RowId = usize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    pub author: String,
    #[serde(rename = "bib")]
    pub bibliography: String,
}

/// A record parsed from the source corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: String,
    pub title: String,
    pub text: String,
    pub metadata: DocMeta,
}

impl Document {
    /// Title and body joined, which is what gets normalized and indexed.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.text)
    }
}

/// A document together with its normalized token string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedDoc {
    #[serde(flatten)]
    pub doc: Document,
    pub processed_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub query_id: String,
    pub text: String,
}

/// Relevance judgments: query id -> relevant doc ids, in file order.
pub type Qrels = HashMap<String, Vec<String>>;

/// Reduced view of a document served by lookup and used for snippets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntry {
    pub title: String,
    pub text: String,
}

pub type DocLookup = HashMap<String, LookupEntry>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub title: String,
    pub snippet: String,
    pub score: f64,
}
