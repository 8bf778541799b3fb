//! Readers for the Cranfield flat-file formats.
//!
//! Records start with a `.I <number>` line. Inside a record, a line holding only
//! `.T`, `.A`, `.B` or `.W` opens the title, author, bibliography or body field,
//! and the field runs until the next marker line or the end of the record.

use crate::error::{Error, Result};
use crate::index::{DocMeta, Document, Qrels, Query};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Author,
    Bibliography,
    Body,
}

impl Field {
    fn from_marker(line: &str) -> Option<Field> {
        match line.trim_end() {
            ".T" => Some(Field::Title),
            ".A" => Some(Field::Author),
            ".B" => Some(Field::Bibliography),
            ".W" => Some(Field::Body),
            _ => None,
        }
    }
}

/// Fields of one record, before validation.
#[derive(Debug, Default)]
struct RawRecord {
    id: Option<String>,
    title: Option<Vec<String>>,
    author: Option<Vec<String>>,
    bibliography: Option<Vec<String>>,
    body: Option<Vec<String>>,
}

impl RawRecord {
    fn slot(&mut self, field: Field) -> &mut Vec<String> {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Author => &mut self.author,
            Field::Bibliography => &mut self.bibliography,
            Field::Body => &mut self.body,
        };
        slot.get_or_insert_with(Vec::new)
    }
}

/// Returns the text after `.I` if the line opens a new record.
fn record_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(".I")?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

/// Leading integer of the header, without zero padding ("001" -> "1").
fn leading_integer(header: &str) -> Option<String> {
    let digits: String = header.trim_start().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<u64>().ok().map(|n| n.to_string())
}

/// Joins field lines with single spaces and trims the result.
fn collapse(lines: &[String]) -> String {
    lines.join(" ").trim().to_string()
}

/// Splits raw content into per-record line groups. Anything before the first
/// `.I` line is dropped.
fn split_records(content: &str) -> Vec<(Option<String>, Vec<&str>)> {
    let mut records: Vec<(Option<String>, Vec<&str>)> = Vec::new();
    for line in content.lines() {
        if let Some(header) = record_header(line) {
            records.push((leading_integer(header), Vec::new()));
        } else if let Some((_, lines)) = records.last_mut() {
            lines.push(line);
        }
    }
    records
}

fn scan_record(id: Option<String>, lines: &[&str]) -> RawRecord {
    let mut raw = RawRecord { id, ..RawRecord::default() };
    let mut current: Option<Field> = None;
    for line in lines {
        if let Some(field) = Field::from_marker(line) {
            raw.slot(field);
            current = Some(field);
        } else if let Some(field) = current {
            raw.slot(field).push(line.to_string());
        }
    }
    raw
}

fn build_document(record: usize, raw: RawRecord) -> Result<Document> {
    let malformed = |reason: &str| Error::Parse { record, reason: reason.to_string() };
    let doc_id = raw.id.ok_or_else(|| malformed("missing numeric identifier"))?;
    let title = raw.title.ok_or_else(|| malformed("missing .T field"))?;
    let body = raw.body.ok_or_else(|| malformed("missing .W field"))?;
    Ok(Document {
        doc_id,
        title: collapse(&title),
        text: collapse(&body),
        metadata: DocMeta {
            author: raw.author.as_deref().map(collapse).unwrap_or_default(),
            bibliography: raw.bibliography.as_deref().map(collapse).unwrap_or_default(),
        },
    })
}

/// Parse a single record chunk (the `.I` line plus the lines that follow it).
pub fn parse_record(record: usize, chunk: &str) -> Result<Document> {
    let mut parsed = split_records(chunk);
    if parsed.len() != 1 {
        return Err(Error::Parse { record, reason: format!("expected one .I line, found {}", parsed.len()) });
    }
    let (id, lines) = parsed.remove(0);
    build_document(record, scan_record(id, &lines))
}

/// Parse every document record in `content`, keeping source order. Malformed
/// records are logged and skipped.
pub fn parse_docs_str(content: &str) -> Vec<Document> {
    let mut docs = Vec::new();
    for (record, (id, lines)) in split_records(content).into_iter().enumerate() {
        match build_document(record, scan_record(id, &lines)) {
            Ok(doc) => docs.push(doc),
            Err(err) => {
                let preview: String = lines.join(" ").chars().take(50).collect();
                tracing::warn!(%err, preview = %preview, "skipping malformed document record");
            }
        }
    }
    docs
}

fn read_source(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Parse a Cranfield document collection such as `cran.all.1400`.
pub fn parse_docs(path: &Path) -> Result<Vec<Document>> {
    let content = read_source(path)?;
    let docs = parse_docs_str(&content);
    tracing::info!(path = %path.display(), num_docs = docs.len(), "parsed documents");
    Ok(docs)
}

pub fn parse_queries_str(content: &str) -> Vec<Query> {
    let mut queries = Vec::new();
    for (record, (id, lines)) in split_records(content).into_iter().enumerate() {
        let raw = scan_record(id, &lines);
        match (raw.id, raw.body) {
            (Some(query_id), Some(body)) => queries.push(Query { query_id, text: collapse(&body) }),
            _ => tracing::warn!(record, "skipping malformed query record"),
        }
    }
    queries
}

/// Parse a Cranfield query file such as `cran.qry`.
pub fn parse_queries(path: &Path) -> Result<Vec<Query>> {
    let content = read_source(path)?;
    let queries = parse_queries_str(&content);
    tracing::info!(path = %path.display(), num_queries = queries.len(), "parsed queries");
    Ok(queries)
}

/// Parse `query_id doc_id relevance` lines. The relevance grade is ignored and
/// lines with fewer than two columns are skipped.
pub fn parse_qrels_str(content: &str) -> Qrels {
    let mut qrels: Qrels = HashMap::new();
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        if let (Some(query_id), Some(doc_id)) = (parts.next(), parts.next()) {
            qrels.entry(query_id.to_string()).or_default().push(doc_id.to_string());
        }
    }
    qrels
}

pub fn parse_qrels(path: &Path) -> Result<Qrels> {
    let content = read_source(path)?;
    let qrels = parse_qrels_str(&content);
    tracing::info!(path = %path.display(), num_queries = qrels.len(), "parsed relevance judgments");
    Ok(qrels)
}
