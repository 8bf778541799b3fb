use crate::context::IndexContext;
use crate::error::{Error, Result};
use crate::index::{RowId, SearchHit};
use crate::matrix::SparseRow;
use crate::tokenizer::normalize;

pub const DEFAULT_K: usize = 10;
pub const SNIPPET_CHARS: usize = 150;
const ELLIPSIS: &str = "...";

/// Cosine similarity of two non-negative vectors, 0 when either is all zeros.
pub fn cosine_similarity(a: &SparseRow<'_>, b: &SparseRow<'_>) -> f64 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(0.0, 1.0)
}

/// First `SNIPPET_CHARS` characters of `text` followed by an ellipsis.
pub fn snippet(text: &str) -> String {
    let mut s: String = text.chars().take(SNIPPET_CHARS).collect();
    s.push_str(ELLIPSIS);
    s
}

/// Score every row against `query` and keep the best `k`, highest first.
/// Equal scores keep row order.
pub fn rank(ctx: &IndexContext, query: &SparseRow<'_>, k: usize) -> Vec<(RowId, f64)> {
    let mut scored: Vec<(RowId, f64)> = ctx
        .matrix()
        .iter_rows()
        .enumerate()
        .map(|(row, doc)| (row, cosine_similarity(query, &doc)))
        .collect();
    // sort_by is stable, so ties stay in ascending row order
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(k);
    scored
}

/// Normalize `query`, project it with the fitted vectorizer and return the top
/// `k` documents by cosine similarity.
pub fn search(ctx: &IndexContext, query: &str, k: usize) -> Result<Vec<SearchHit>> {
    if query.trim().is_empty() {
        return Err(Error::InvalidArgument("Missing query parameter 'q'".into()));
    }
    if k == 0 {
        return Err(Error::InvalidArgument("k must be at least 1".into()));
    }
    let processed = normalize(query);
    let query_vec = ctx.vectorizer().transform_one(&processed);
    tracing::debug!(query, processed = %processed, terms = query_vec.indices.len(), "search");

    let mut hits = Vec::with_capacity(k.min(ctx.num_docs()));
    for (row, score) in rank(ctx, &query_vec.as_row(), k) {
        let doc_id = ctx
            .doc_id_of(row)
            .ok_or_else(|| Error::Corrupt(format!("row {row} has no doc_id")))?;
        let entry = ctx.lookup(doc_id)?;
        hits.push(SearchHit {
            doc_id: doc_id.to_string(),
            title: entry.title.clone(),
            snippet: snippet(&entry.text),
            score,
        });
    }
    Ok(hits)
}
