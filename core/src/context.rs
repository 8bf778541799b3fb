use crate::builder::BuiltIndex;
use crate::error::{Error, Result};
use crate::index::{DocLookup, LookupEntry, RowId};
use crate::matrix::CsrMatrix;
use crate::persist::{load_doc_lookup, load_doc_order, load_matrix, load_meta, load_vectorizer, DataPaths, MetaFile};
use crate::vectorizer::TfidfVectorizer;

/// Read-only state for search and lookup, loaded once and shared by reference.
#[derive(Debug)]
pub struct IndexContext {
    vectorizer: TfidfVectorizer,
    matrix: CsrMatrix,
    lookup: DocLookup,
    index_to_doc_id: Vec<String>,
    meta: Option<MetaFile>,
}

impl IndexContext {
    /// Load every artifact from the data directory and check that they agree.
    pub fn load(paths: &DataPaths) -> Result<Self> {
        let vectorizer = load_vectorizer(paths)?;
        let matrix = load_matrix(paths)?;
        let lookup = load_doc_lookup(paths)?;
        let index_to_doc_id = load_doc_order(paths)?;
        let meta = load_meta(paths)?;
        let ctx = Self::new(vectorizer, matrix, lookup, index_to_doc_id, Some(meta))?;
        tracing::info!(
            root = %paths.root.display(),
            num_docs = ctx.num_docs(),
            vocab_size = ctx.vectorizer.vocab_size(),
            "index context loaded"
        );
        Ok(ctx)
    }

    pub fn from_built(index: BuiltIndex) -> Result<Self> {
        Self::new(index.vectorizer, index.matrix, index.lookup, index.doc_order, None)
    }

    fn new(
        vectorizer: TfidfVectorizer,
        matrix: CsrMatrix,
        lookup: DocLookup,
        index_to_doc_id: Vec<String>,
        meta: Option<MetaFile>,
    ) -> Result<Self> {
        if !matrix.is_well_formed() || !vectorizer.is_consistent() {
            return Err(Error::Corrupt("matrix or vectorizer is structurally invalid".into()));
        }
        if matrix.rows() != index_to_doc_id.len() {
            return Err(Error::Corrupt(format!(
                "matrix has {} rows but the row order lists {} documents",
                matrix.rows(),
                index_to_doc_id.len()
            )));
        }
        if matrix.cols() != vectorizer.vocab_size() {
            return Err(Error::Corrupt(format!(
                "matrix has {} columns but the vocabulary has {} terms",
                matrix.cols(),
                vectorizer.vocab_size()
            )));
        }
        if let Some(missing) = index_to_doc_id.iter().find(|id| !lookup.contains_key(*id)) {
            return Err(Error::Corrupt(format!("row doc_id {missing} is absent from the lookup table")));
        }
        Ok(Self { vectorizer, matrix, lookup, index_to_doc_id, meta })
    }

    /// Exact-match document lookup.
    pub fn lookup(&self, doc_id: &str) -> Result<&LookupEntry> {
        self.lookup.get(doc_id).ok_or_else(|| Error::NotFound(doc_id.to_string()))
    }

    pub fn doc_id_of(&self, row: RowId) -> Option<&str> {
        self.index_to_doc_id.get(row).map(String::as_str)
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn matrix(&self) -> &CsrMatrix {
        &self.matrix
    }

    pub fn num_docs(&self) -> usize {
        self.index_to_doc_id.len()
    }

    pub fn meta(&self) -> Option<&MetaFile> {
        self.meta.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_index, normalize_documents, write_index};
    use crate::index::{DocMeta, Document};
    use crate::vectorizer::VectorizerConfig;

    fn built() -> BuiltIndex {
        let docs = normalize_documents(vec![
            Document { doc_id: "1".into(), title: "heat".into(), text: "heat flux".into(), metadata: DocMeta::default() },
            Document { doc_id: "2".into(), title: "wing".into(), text: "wing flutter".into(), metadata: DocMeta::default() },
        ]);
        build_index(&docs, VectorizerConfig { min_df: 1, max_df: 1.0, min_token_len: 2 }).unwrap()
    }

    #[test]
    fn lookup_is_exact() {
        let ctx = IndexContext::from_built(built()).unwrap();
        assert_eq!(ctx.lookup("2").unwrap().title, "wing");
        assert!(matches!(ctx.lookup("02"), Err(Error::NotFound(_))));
        assert!(matches!(ctx.lookup("999"), Err(Error::NotFound(_))));
    }

    #[test]
    fn row_order_mismatch_is_corrupt() {
        let mut index = built();
        index.doc_order.pop();
        assert!(matches!(IndexContext::from_built(index), Err(Error::Corrupt(_))));
    }

    #[test]
    fn unknown_row_id_is_corrupt() {
        let mut index = built();
        index.doc_order[1] = "77".into();
        assert!(matches!(IndexContext::from_built(index), Err(Error::Corrupt(_))));
    }

    #[test]
    fn load_reads_back_written_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        write_index(&paths, &built()).unwrap();
        let ctx = IndexContext::load(&paths).unwrap();
        assert_eq!(ctx.num_docs(), 2);
        assert_eq!(ctx.doc_id_of(0), Some("1"));
        assert_eq!(ctx.doc_id_of(1), Some("2"));
        assert_eq!(ctx.meta().map(|m| m.num_docs), Some(2));
    }
}
