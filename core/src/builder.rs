use crate::error::{Error, Result};
use crate::index::{DocLookup, Document, LookupEntry, NormalizedDoc};
use crate::matrix::CsrMatrix;
use crate::persist::{
    load_docs, save_doc_lookup, save_doc_order, save_matrix, save_meta, save_vectorizer, DataPaths, MetaFile,
    FORMAT_VERSION,
};
use crate::tokenizer::normalize;
use crate::vectorizer::{TfidfVectorizer, VectorizerConfig};

/// Everything the offline build produces, in memory.
#[derive(Debug, Clone)]
pub struct BuiltIndex {
    pub vectorizer: TfidfVectorizer,
    pub matrix: CsrMatrix,
    pub lookup: DocLookup,
    /// Row `i` of `matrix` belongs to `doc_order[i]`.
    pub doc_order: Vec<String>,
}

/// Attach the normalized title + body to every parsed document.
pub fn normalize_documents(docs: Vec<Document>) -> Vec<NormalizedDoc> {
    docs.into_iter()
        .map(|doc| {
            let processed_text = normalize(&doc.full_text());
            NormalizedDoc { doc, processed_text }
        })
        .collect()
}

/// Fit the vectorizer and lay out the matrix rows in the order of `docs`.
pub fn build_index(docs: &[NormalizedDoc], config: VectorizerConfig) -> Result<BuiltIndex> {
    let mut corpus = Vec::with_capacity(docs.len());
    let mut doc_order = Vec::with_capacity(docs.len());
    let mut lookup = DocLookup::with_capacity(docs.len());
    for d in docs {
        let entry = LookupEntry { title: d.doc.title.clone(), text: d.doc.text.clone() };
        if lookup.insert(d.doc.doc_id.clone(), entry).is_some() {
            return Err(Error::Configuration(format!("duplicate doc_id {}", d.doc.doc_id)));
        }
        corpus.push(d.processed_text.as_str());
        doc_order.push(d.doc.doc_id.clone());
    }
    tracing::info!(num_docs = corpus.len(), "built corpus");

    let (vectorizer, matrix) = TfidfVectorizer::fit_transform(&corpus, config)?;
    tracing::info!(rows = matrix.rows(), cols = matrix.cols(), nnz = matrix.nnz(), "tf-idf matrix created");
    Ok(BuiltIndex { vectorizer, matrix, lookup, doc_order })
}

pub fn write_index(paths: &DataPaths, index: &BuiltIndex) -> Result<()> {
    save_vectorizer(paths, &index.vectorizer)?;
    save_matrix(paths, &index.matrix)?;
    save_doc_lookup(paths, &index.lookup, &index.doc_order)?;
    save_doc_order(paths, &index.doc_order)?;
    let meta = MetaFile {
        num_docs: index.doc_order.len(),
        vocab_size: index.vectorizer.vocab_size(),
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        version: FORMAT_VERSION,
    };
    save_meta(paths, &meta)?;
    tracing::info!(root = %paths.root.display(), "index artifacts written");
    Ok(())
}

/// Read the normalized documents from the data directory, build, and persist.
pub fn build_from_data_dir(paths: &DataPaths, config: VectorizerConfig) -> Result<BuiltIndex> {
    let docs = load_docs(paths)?;
    tracing::info!(path = %paths.docs().display(), num_docs = docs.len(), "loaded processed documents");
    let index = build_index(&docs, config)?;
    write_index(paths, &index)?;
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DocMeta;

    fn doc(id: &str, title: &str, text: &str) -> Document {
        Document { doc_id: id.into(), title: title.into(), text: text.into(), metadata: DocMeta::default() }
    }

    fn loose() -> VectorizerConfig {
        VectorizerConfig { min_df: 1, max_df: 1.0, min_token_len: 2 }
    }

    #[test]
    fn row_order_follows_input_order() {
        let docs = normalize_documents(vec![
            doc("9", "shock waves", "supersonic shock"),
            doc("3", "boundary layer", "laminar boundary layer"),
            doc("5", "heat transfer", "heat flux at the wall"),
        ]);
        let built = build_index(&docs, loose()).unwrap();
        assert_eq!(built.doc_order, vec!["9", "3", "5"]);
        for (i, d) in docs.iter().enumerate() {
            let expected = built.vectorizer.transform_one(&d.processed_text);
            let row = built.matrix.row(i);
            assert_eq!(row.indices, expected.indices.as_slice());
            assert_eq!(built.doc_order[i], d.doc.doc_id);
        }
    }

    #[test]
    fn processed_text_covers_title_and_body() {
        let docs = normalize_documents(vec![doc("1", "Heat Transfer", "boundary layer flow")]);
        assert_eq!(docs[0].processed_text, normalize("Heat Transfer boundary layer flow"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let docs = normalize_documents(vec![doc("1", "a title", "text"), doc("1", "other", "text")]);
        assert!(matches!(build_index(&docs, loose()), Err(Error::Configuration(_))));
    }

    #[test]
    fn empty_corpus_is_rejected() {
        assert!(matches!(build_index(&[], loose()), Err(Error::Configuration(_))));
    }

    #[test]
    fn missing_docs_json_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        let err = build_from_data_dir(&paths, loose()).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
