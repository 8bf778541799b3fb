use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cranfield_core::builder::{build_from_data_dir, normalize_documents};
use cranfield_core::eval::evaluate;
use cranfield_core::parser::{parse_docs, parse_qrels, parse_queries};
use cranfield_core::persist::{load_qrels, load_queries, save_docs, save_qrels, save_queries, DataPaths};
use cranfield_core::{IndexContext, VectorizerConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Parse the Cranfield collection and build its TF-IDF index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and normalize the raw collection into JSON under the data directory
    Parse {
        /// Document collection (cran.all.1400)
        #[arg(long, default_value = "cran.all.1400")]
        corpus: PathBuf,
        /// Query file (cran.qry)
        #[arg(long)]
        queries: Option<PathBuf>,
        /// Relevance judgments (cranqrel)
        #[arg(long)]
        qrels: Option<PathBuf>,
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Fit the vectorizer over the parsed documents and write the index artifacts
    Build {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        /// Ignore terms found in fewer documents than this
        #[arg(long, default_value_t = 5)]
        min_df: usize,
        /// Ignore terms found in more than this fraction of documents
        #[arg(long, default_value_t = 0.95)]
        max_df: f64,
    },
    /// Score the built index against the parsed queries and judgments
    Evaluate {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        /// Cutoff for precision and recall
        #[arg(long, default_value_t = 10)]
        k: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { corpus, queries, qrels, data_dir } => parse_collection(&corpus, queries, qrels, &data_dir),
        Commands::Build { data_dir, min_df, max_df } => {
            let config = VectorizerConfig { min_df, max_df, ..VectorizerConfig::default() };
            let index = build_from_data_dir(&DataPaths::new(&data_dir), config)
                .with_context(|| format!("building index in {}", data_dir.display()))?;
            println!(
                "indexed {} documents, vocabulary of {} terms",
                index.doc_order.len(),
                index.vectorizer.vocab_size()
            );
            Ok(())
        }
        Commands::Evaluate { data_dir, k } => {
            let paths = DataPaths::new(&data_dir);
            let ctx = IndexContext::load(&paths).context("loading index (run `indexer build` first)")?;
            let queries = load_queries(&paths).context("loading queries (run `indexer parse --queries`)")?;
            let qrels = load_qrels(&paths).context("loading qrels (run `indexer parse --qrels`)")?;
            let summary = evaluate(&ctx, &queries, &qrels, k)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
    }
}

fn parse_collection(corpus: &Path, queries: Option<PathBuf>, qrels: Option<PathBuf>, data_dir: &Path) -> Result<()> {
    let paths = DataPaths::new(data_dir);

    let docs = parse_docs(corpus).with_context(|| format!("parsing {}", corpus.display()))?;
    let docs = normalize_documents(docs);
    if let Some(first) = docs.first() {
        let preview: String = first.processed_text.chars().take(250).collect();
        tracing::info!(doc_id = %first.doc.doc_id, processed = %preview, "normalization sample");
    }
    save_docs(&paths, &docs)?;
    tracing::info!(path = %paths.docs().display(), num_docs = docs.len(), "saved processed documents");

    if let Some(path) = queries {
        let parsed = parse_queries(&path).with_context(|| format!("parsing {}", path.display()))?;
        save_queries(&paths, &parsed)?;
    }
    if let Some(path) = qrels {
        let parsed = parse_qrels(&path).with_context(|| format!("parsing {}", path.display()))?;
        save_qrels(&paths, &parsed)?;
    }
    Ok(())
}
