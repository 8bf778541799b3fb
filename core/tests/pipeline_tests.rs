use cranfield_core::builder::{build_from_data_dir, normalize_documents};
use cranfield_core::eval::evaluate;
use cranfield_core::parser::{parse_docs, parse_qrels_str, parse_queries_str};
use cranfield_core::persist::{save_docs, DataPaths};
use cranfield_core::search::search;
use cranfield_core::{Error, IndexContext, VectorizerConfig};
use std::fs;

const CORPUS: &str = "\
.I 1
.T
heat transfer in laminar boundary layers
.A
smith,j.
.B
j. ae. scs. 20, 1953.
.W
heat transfer through a laminar boundary layer
on a heated flat plate .
.I 2
.T
supersonic flow past a wedge
.A
jones,r.
.B
arc r + m 2000.
.W
the shock wave attached to a wedge in supersonic
flow is computed .
.I 3
.T
flutter of a swept wing
.W
flutter speeds of swept wings are measured in a
wind tunnel .
.I x
.T
record without a usable id
.W
ignored .
";

fn config() -> VectorizerConfig {
    VectorizerConfig { min_df: 1, max_df: 0.95, min_token_len: 2 }
}

fn build(dir: &std::path::Path) -> (DataPaths, IndexContext) {
    let corpus_path = dir.join("cran.all.1400");
    fs::write(&corpus_path, CORPUS).unwrap();
    let docs = parse_docs(&corpus_path).unwrap();
    let paths = DataPaths::new(dir.join("data"));
    save_docs(&paths, &normalize_documents(docs)).unwrap();
    build_from_data_dir(&paths, config()).unwrap();
    let ctx = IndexContext::load(&paths).unwrap();
    (paths, ctx)
}

#[test]
fn malformed_record_is_skipped_and_rows_follow_source_order() {
    let dir = tempfile::tempdir().unwrap();
    let (_, ctx) = build(dir.path());
    assert_eq!(ctx.num_docs(), 3);
    for (row, id) in ["1", "2", "3"].iter().enumerate() {
        assert_eq!(ctx.doc_id_of(row), Some(*id));
    }
}

#[test]
fn every_document_ranks_itself_first() {
    let dir = tempfile::tempdir().unwrap();
    let (_, ctx) = build(dir.path());
    for id in ["1", "2", "3"] {
        let entry = ctx.lookup(id).unwrap().clone();
        let hits = search(&ctx, &format!("{} {}", entry.title, entry.text), 3).unwrap();
        assert_eq!(hits[0].doc_id, id);
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }
}

#[test]
fn search_and_lookup_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let (_, ctx) = build(dir.path());

    let hits = search(&ctx, "shock waves on a wedge", 10).unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].doc_id, "2");
    assert_eq!(hits[0].title, "supersonic flow past a wedge");
    assert!(hits[0].snippet.ends_with("..."));

    let doc = ctx.lookup("3").unwrap();
    assert_eq!(doc.text, "flutter speeds of swept wings are measured in a wind tunnel .");
    assert!(matches!(ctx.lookup("999"), Err(Error::NotFound(_))));
}

#[test]
fn evaluation_uses_query_ordinals() {
    let dir = tempfile::tempdir().unwrap();
    let (_, ctx) = build(dir.path());
    // .I numbers skip, judgments refer to positions 1 and 2
    let queries = parse_queries_str(".I 001\n.W\nlaminar heat transfer\n.I 004\n.W\nswept wing flutter\n");
    let qrels = parse_qrels_str("1 1 2\n2 3 1\n");
    let summary = evaluate(&ctx, &queries, &qrels, 1).unwrap();
    assert_eq!(summary.num_queries, 2);
    assert!((summary.mean_precision - 1.0).abs() < 1e-12);
    assert!((summary.mean_average_precision - 1.0).abs() < 1e-12);
}

#[test]
fn missing_artifacts_fail_fast() {
    let dir = tempfile::tempdir().unwrap();
    let err = IndexContext::load(&DataPaths::new(dir.path())).unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
}
