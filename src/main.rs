use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use memento_curator::config::CuratorConfig;
use memento_curator::infra::extractor::ParagraphExtractor;
use memento_curator::infra::fingerprint::Sha256Fingerprinter;
use memento_curator::infra::http_client::CachedHttpClient;
use memento_curator::infra::sqlite_store::{SqliteDerivedStore, SqliteErrorStore};
use memento_curator::logging;
use memento_curator::model::CollectionModel;
use memento_curator::pipeline::classify::{detect_off_topic, MeasureCatalog};
use memento_curator::pipeline::dedup::list_canonical_urims;
use memento_curator::pipeline::ingestion::add_many_mementos;

#[derive(Parser)]
#[command(name = "memento-curator")]
#[command(about = "Web archive collection curation: ingest, classify, dedupe")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register TimeMaps and ingest every memento they list
    Ingest {
        /// TimeMap URI-Ts to ingest (repeatable)
        #[arg(long = "timemap", required = true)]
        timemaps: Vec<String>,
    },
    /// Ingest, then report the on-topic URI-Ms
    Classify {
        #[arg(long = "timemap", required = true)]
        timemaps: Vec<String>,
        /// Override the configured topic count for topic-model measures
        #[arg(long)]
        topic_count: Option<usize>,
    },
    /// Ingest, then report canonical URI-Ms after near-duplicate collapse
    Dedupe {
        #[arg(long = "timemap", required = true)]
        timemaps: Vec<String>,
    },
}

fn build_model(config: &CuratorConfig) -> Result<CollectionModel, Box<dyn std::error::Error>> {
    let fetch = Arc::new(CachedHttpClient::new(config.cache_dir()));
    let errors = Arc::new(SqliteErrorStore::open_at_root(&config.data_root)?);
    let derived = Arc::new(SqliteDerivedStore::open_at_root(&config.data_root)?);
    Ok(CollectionModel::new(
        fetch,
        errors,
        derived,
        Arc::new(ParagraphExtractor),
        Arc::new(Sha256Fingerprinter),
    ))
}

async fn ingest_timemaps(
    model: &mut CollectionModel,
    timemaps: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut urims = Vec::new();
    for urit in timemaps {
        info!(urit, "registering TimeMap");
        model.add_timemap(urit).await?;
        let timemap = model.get_timemap(urit).await?;
        urims.extend(timemap.mementos.iter().map(|m| m.urim.clone()));
    }
    add_many_mementos(model, &urims).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => CuratorConfig::load(path)?,
        None => CuratorConfig::default(),
    };

    match cli.command {
        Commands::Ingest { timemaps } => {
            println!("📥 Ingesting {} TimeMap(s)...", timemaps.len());
            let mut model = build_model(&config)?;
            ingest_timemaps(&mut model, &timemaps).await?;
            println!("   Registered mementos: {}", model.get_memento_uri_list().len());
        }
        Commands::Classify { timemaps, topic_count } => {
            println!("🔎 Classifying {} TimeMap(s)...", timemaps.len());
            let mut model = build_model(&config)?;
            ingest_timemaps(&mut model, &timemaps).await?;

            let catalog = MeasureCatalog::builtin();
            let requested = config.resolved_measures(&catalog)?;
            let topics = topic_count.or(config.topic_count);
            let ontopic = detect_off_topic(&model, &catalog, &requested, topics).await?;

            println!("   On-topic mementos: {}", ontopic.len());
            for urim in &ontopic {
                println!("{urim}");
            }
        }
        Commands::Dedupe { timemaps } => {
            println!("🧹 Deduplicating {} TimeMap(s)...", timemaps.len());
            let mut model = build_model(&config)?;
            ingest_timemaps(&mut model, &timemaps).await?;

            let canonical = list_canonical_urims(&model).await?;
            println!("   Canonical mementos: {}", canonical.len());
            for urim in &canonical {
                println!("{urim}");
            }
        }
    }

    Ok(())
}
