//! Retrieval quality against the Cranfield relevance judgments.
//!
//! `cranqrel` numbers queries by their position in `cran.qry` (1, 2, 3, ...),
//! not by the `.I` value, so judgments are matched by ordinal.

use crate::context::IndexContext;
use crate::error::{Error, Result};
use crate::index::{Qrels, Query};
use crate::search::search;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvalSummary {
    pub k: usize,
    pub num_queries: usize,
    pub mean_precision: f64,
    pub mean_recall: f64,
    pub mean_average_precision: f64,
}

pub fn precision_at_k(ranked: &[&str], relevant: &HashSet<&str>, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let hits = ranked.iter().take(k).filter(|id| relevant.contains(*id)).count();
    hits as f64 / k as f64
}

pub fn recall_at_k(ranked: &[&str], relevant: &HashSet<&str>, k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let hits = ranked.iter().take(k).filter(|id| relevant.contains(*id)).count();
    hits as f64 / relevant.len() as f64
}

/// Mean of the precision values at each rank where a relevant document appears,
/// divided over all relevant documents (unretrieved ones contribute zero).
pub fn average_precision(ranked: &[&str], relevant: &HashSet<&str>) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let mut hits = 0usize;
    let mut sum = 0.0;
    for (i, id) in ranked.iter().enumerate() {
        if relevant.contains(id) {
            hits += 1;
            sum += hits as f64 / (i + 1) as f64;
        }
    }
    sum / relevant.len() as f64
}

/// Run every judged query through the search engine. Only documents with a
/// positive score count as retrieved.
pub fn evaluate(ctx: &IndexContext, queries: &[Query], qrels: &Qrels, k: usize) -> Result<EvalSummary> {
    if k == 0 {
        return Err(Error::InvalidArgument("k must be at least 1".into()));
    }
    let mut num_queries = 0usize;
    let (mut p_sum, mut r_sum, mut ap_sum) = (0.0, 0.0, 0.0);

    for (ordinal, query) in queries.iter().enumerate() {
        let Some(judged) = qrels.get(&(ordinal + 1).to_string()) else {
            continue;
        };
        let relevant: HashSet<&str> = judged.iter().map(String::as_str).collect();
        let hits = if query.text.trim().is_empty() {
            Vec::new()
        } else {
            search(ctx, &query.text, ctx.num_docs().max(1))?
        };
        let ranked: Vec<&str> = hits.iter().filter(|h| h.score > 0.0).map(|h| h.doc_id.as_str()).collect();

        p_sum += precision_at_k(&ranked, &relevant, k);
        r_sum += recall_at_k(&ranked, &relevant, k);
        ap_sum += average_precision(&ranked, &relevant);
        num_queries += 1;
        tracing::debug!(query_id = %query.query_id, ordinal = ordinal + 1, retrieved = ranked.len(), "evaluated query");
    }

    let denom = num_queries.max(1) as f64;
    let summary = EvalSummary {
        k,
        num_queries,
        mean_precision: p_sum / denom,
        mean_recall: r_sum / denom,
        mean_average_precision: ap_sum / denom,
    };
    tracing::info!(
        k,
        num_queries,
        mean_precision = summary.mean_precision,
        mean_recall = summary.mean_recall,
        map = summary.mean_average_precision,
        "evaluation complete"
    );
    Ok(summary)
}
