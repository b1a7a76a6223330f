use anyhow::Result;
use clap::{Parser, Subcommand};
use rummage::config::{SearchConfig, Settings};
use rummage::store::FileStore;
use rummage::SearchEngine;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "rummage")]
#[command(about = "TF-IDF document search over a local document store", long_about = None)]
struct Cli {
    /// Document store directory
    #[arg(long, default_value = "./documents")]
    store: PathBuf,
    /// Optional JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add documents from files or directories (.txt and .md)
    Add {
        paths: Vec<PathBuf>,
    },
    /// Search the indexed corpus
    Search {
        query: String,
        /// Print the full response as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Remove a document by id and rebuild the index
    Remove {
        doc_id: String,
    },
    /// List stored documents
    List,
    /// Show engine statistics
    Stats,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let config = SearchConfig::from_settings(&settings);
    let store = FileStore::open(&cli.store)?;
    let mut engine = SearchEngine::new(config, store);

    match cli.command {
        Commands::Add { paths } => add_documents(&mut engine, &paths),
        Commands::Search { query, json } => run_search(&mut engine, &query, json),
        Commands::Remove { doc_id } => {
            if engine.remove_document(&doc_id)? {
                println!("removed {doc_id}");
            } else {
                println!("no document with id {doc_id}");
            }
            Ok(())
        }
        Commands::List => {
            for info in engine.list_documents() {
                println!("{} ({} chars, added {})", info.doc_id, info.content_length, info.added_at);
            }
            Ok(())
        }
        Commands::Stats => {
            println!("{}", serde_json::to_string_pretty(&engine.get_statistics())?);
            Ok(())
        }
    }
}

fn add_documents(engine: &mut SearchEngine<FileStore>, paths: &[PathBuf]) -> Result<()> {
    let mut documents: BTreeMap<String, String> = BTreeMap::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
                let p = entry.path();
                if p.is_file() && has_text_extension(p) {
                    if let Some(stem) = p.file_stem().and_then(|s| s.to_str()) {
                        documents.insert(stem.to_string(), fs::read_to_string(p)?);
                    }
                }
            }
        } else if path.is_file() {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                documents.insert(stem.to_string(), fs::read_to_string(path)?);
            }
        } else {
            tracing::warn!(path = %path.display(), "input path not found, skipping");
        }
    }

    if documents.is_empty() {
        println!("no documents found");
        return Ok(());
    }

    let count = documents.len();
    engine.add_documents(documents)?;
    engine.build_index();
    println!("added {count} documents");
    Ok(())
}

fn has_text_extension(path: &std::path::Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("txt") | Some("md")
    )
}

fn run_search(engine: &mut SearchEngine<FileStore>, query: &str, json: bool) -> Result<()> {
    let response = engine.search(query);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if let Some(error) = &response.query_info.error {
        println!("{error}");
        return Ok(());
    }
    if let Some(message) = &response.query_info.message {
        println!("{message}");
        return Ok(());
    }

    println!(
        "{} of {} candidates ({:.4}s)",
        response.total_results, response.total_candidates, response.search_time_secs
    );
    for result in &response.results {
        println!("{:>3}. {} (score: {:.4})", result.rank, result.doc_id, result.similarity_score);
        if let Some(preview) = &result.preview {
            println!("     {preview}");
        }
    }
    Ok(())
}
