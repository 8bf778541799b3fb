use crate::error::{Error, Result};
use crate::index::{DocLookup, NormalizedDoc, Qrels, Query};
use crate::matrix::CsrMatrix;
use crate::vectorizer::TfidfVectorizer;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: usize,
    pub vocab_size: usize,
    pub created_at: String,
    pub version: u32,
}

/// File locations shared by the indexer and the server, all under one data directory.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn docs(&self) -> PathBuf { self.root.join("cranfield_docs.json") }
    pub fn queries(&self) -> PathBuf { self.root.join("cranfield_queries.json") }
    pub fn qrels(&self) -> PathBuf { self.root.join("cranfield_qrels.json") }
    pub fn vectorizer(&self) -> PathBuf { self.root.join("tfidf_vectorizer.bin") }
    pub fn matrix(&self) -> PathBuf { self.root.join("tfidf_matrix.bin") }
    pub fn doc_lookup(&self) -> PathBuf { self.root.join("doc_lookup.json") }
    pub fn doc_order(&self) -> PathBuf { self.root.join("doc_order.json") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn open(path: &Path) -> Result<File> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    Ok(File::open(path)?)
}

fn create(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut w = BufWriter::new(create(path)?);
    serde_json::to_writer_pretty(&mut w, value)?;
    w.flush()?;
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn save_bin<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = bincode::serialize(value)?;
    let mut f = create(path)?;
    f.write_all(&bytes)?;
    Ok(())
}

fn load_bin<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let mut f = open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(bincode::deserialize(&buf)?)
}

pub fn save_docs(paths: &DataPaths, docs: &[NormalizedDoc]) -> Result<()> {
    save_json(&paths.docs(), docs)
}

pub fn load_docs(paths: &DataPaths) -> Result<Vec<NormalizedDoc>> {
    load_json(&paths.docs())
}

pub fn save_queries(paths: &DataPaths, queries: &[Query]) -> Result<()> {
    save_json(&paths.queries(), queries)
}

pub fn load_queries(paths: &DataPaths) -> Result<Vec<Query>> {
    load_json(&paths.queries())
}

pub fn save_qrels(paths: &DataPaths, qrels: &Qrels) -> Result<()> {
    save_json(&paths.qrels(), qrels)
}

pub fn load_qrels(paths: &DataPaths) -> Result<Qrels> {
    load_json(&paths.qrels())
}

pub fn save_vectorizer(paths: &DataPaths, vectorizer: &TfidfVectorizer) -> Result<()> {
    save_bin(&paths.vectorizer(), vectorizer)
}

pub fn load_vectorizer(paths: &DataPaths) -> Result<TfidfVectorizer> {
    load_bin(&paths.vectorizer())
}

pub fn save_matrix(paths: &DataPaths, matrix: &CsrMatrix) -> Result<()> {
    save_bin(&paths.matrix(), matrix)
}

pub fn load_matrix(paths: &DataPaths) -> Result<CsrMatrix> {
    load_bin(&paths.matrix())
}

/// Lookup table serialized as a JSON object whose keys follow the matrix row order.
struct OrderedLookup<'a> {
    lookup: &'a DocLookup,
    order: &'a [String],
}

impl Serialize for OrderedLookup<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.order.iter().filter_map(|id| self.lookup.get(id).map(|entry| (id, entry))))
    }
}

/// Write the lookup table with keys in `order`, which must name every entry exactly once.
pub fn save_doc_lookup(paths: &DataPaths, lookup: &DocLookup, order: &[String]) -> Result<()> {
    if order.len() != lookup.len() {
        return Err(Error::Corrupt(format!(
            "row order has {} ids but the lookup table has {} entries",
            order.len(),
            lookup.len()
        )));
    }
    if let Some(missing) = order.iter().find(|id| !lookup.contains_key(*id)) {
        return Err(Error::Corrupt(format!("row doc_id {missing} is absent from the lookup table")));
    }
    save_json(&paths.doc_lookup(), &OrderedLookup { lookup, order })
}

pub fn load_doc_lookup(paths: &DataPaths) -> Result<DocLookup> {
    load_json(&paths.doc_lookup())
}

/// Row order of the document-term matrix: entry `i` is the doc id of row `i`.
pub fn save_doc_order(paths: &DataPaths, order: &[String]) -> Result<()> {
    save_json(&paths.doc_order(), order)
}

pub fn load_doc_order(paths: &DataPaths) -> Result<Vec<String>> {
    load_json(&paths.doc_order())
}

pub fn save_meta(paths: &DataPaths, meta: &MetaFile) -> Result<()> {
    save_json(&paths.meta(), meta)
}

pub fn load_meta(paths: &DataPaths) -> Result<MetaFile> {
    load_json(&paths.meta())
}
