//! zrviz-admin - corpus import and maintenance

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use tracing::info;
use zrviz_common::config::{load_config, RootFolderInitializer, RootFolderResolver};
use zrviz_common::db::{init_database, AudioFormat};
use zrviz_web::db::{categories, corpora, places, topics};
use zrviz_web::import::{self, CorpusImporter, ImportRequest};
use zrviz_web::log_filter;

#[derive(Debug, Parser)]
#[command(version, about = "Import and maintain zrviz corpora")]
struct Cli {
    /// Bootstrap config file (defaults to ~/.config/zrviz/config.toml)
    #[arg(short, long, global = true, env = "ZRVIZ_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder holding zrviz.db
    #[arg(short, long, global = true)]
    root_folder: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import pipeline output as a new corpus
    Import {
        /// Corpus name
        #[arg(long)]
        name: String,
        /// Fragment ("nodes") file
        #[arg(long)]
        fragments: PathBuf,
        /// Cluster ("dedups") file
        #[arg(long)]
        clusters: PathBuf,
        /// Audio file list
        #[arg(long)]
        filenames: PathBuf,
        /// Sample rate of the corpus audio in Hz
        #[arg(long, default_value_t = 16000)]
        rate: u32,
        #[arg(long, default_value_t = 1)]
        channels: u16,
        /// Bits per sample
        #[arg(long, default_value_t = 16)]
        precision: u16,
        /// Require the access token to view the corpus
        #[arg(long)]
        protected: bool,
    },
    /// Re-probe documents imported with a zero duration
    BackfillDurations { corpus_id: i64 },
    /// List corpora
    List,
    /// Mark a corpus as protected or public
    Protect {
        corpus_id: i64,
        /// Make the corpus public again
        #[arg(long)]
        off: bool,
    },
    /// Create a document topic
    AddTopic {
        corpus_id: i64,
        label: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Create a term category
    AddCategory { corpus_id: i64, name: String },
    /// Register a knowledge-base place
    AddPlace {
        corpus_id: i64,
        kb_id: String,
        #[arg(long, default_value = "")]
        english: String,
        #[arg(long, default_value = "")]
        native: String,
    },
    /// Attach `<zr_term_index> <category> <score>` rows to a topic
    ImportTermInfo { topic_id: i64, file: PathBuf },
    /// Write `<zr_term_index>\t<label>` for every term of a corpus
    ExportLabels {
        corpus_id: i64,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&config.logging))
        .with_writer(io::stderr)
        .init();

    info!(
        "zrviz-admin v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new("zrviz-admin")
        .with_cli_arg(cli.root_folder)
        .with_toml_config(&config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;
    let pool = init_database(&initializer.database_path()).await?;

    run(cli.command, &pool).await
}

async fn run(command: Command, pool: &SqlitePool) -> Result<()> {
    match command {
        Command::Import {
            name,
            fragments,
            clusters,
            filenames,
            rate,
            channels,
            precision,
            protected,
        } => {
            let request = ImportRequest {
                corpus_name: name,
                fragments_path: fragments,
                clusters_path: clusters,
                filenames_path: filenames,
                format: AudioFormat {
                    rate,
                    channels,
                    precision,
                },
                protected,
            };
            let summary = CorpusImporter::new(pool.clone())
                .import(&request)
                .await
                .context("Import failed")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::BackfillDurations { corpus_id } => {
            let updated = CorpusImporter::new(pool.clone())
                .backfill_durations(corpus_id)
                .await?;
            println!("Updated {} documents", updated);
        }
        Command::List => {
            for corpus in corpora::list_corpora(pool).await? {
                let documents = corpora::count_documents(pool, corpus.id).await?;
                println!(
                    "{}\t{}\t{} Hz/{} ch/{} bit\t{} documents{}",
                    corpus.id,
                    corpus.name,
                    corpus.audio_rate,
                    corpus.audio_channels,
                    corpus.audio_precision,
                    documents,
                    if corpus.protected_corpus { "\tprotected" } else { "" }
                );
            }
        }
        Command::Protect { corpus_id, off } => {
            corpora::set_protected(pool, corpus_id, !off).await?;
            println!("Corpus {} is now {}", corpus_id, if off { "public" } else { "protected" });
        }
        Command::AddTopic {
            corpus_id,
            label,
            description,
        } => {
            corpora::get_corpus(pool, corpus_id).await?;
            let id = topics::insert_topic(pool, corpus_id, &label, &description).await?;
            println!("{}", id);
        }
        Command::AddCategory { corpus_id, name } => {
            corpora::get_corpus(pool, corpus_id).await?;
            let id = categories::insert_category(pool, corpus_id, &name).await?;
            println!("{}", id);
        }
        Command::AddPlace {
            corpus_id,
            kb_id,
            english,
            native,
        } => {
            corpora::get_corpus(pool, corpus_id).await?;
            let id = places::insert_place(pool, corpus_id, &kb_id, &english, &native).await?;
            println!("{}", id);
        }
        Command::ImportTermInfo { topic_id, file } => {
            let rows = import::import_term_info(pool, topic_id, &file).await?;
            println!("Imported {} rows", rows);
        }
        Command::ExportLabels { corpus_id, output } => {
            let written = match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    import::export_term_labels(pool, corpus_id, BufWriter::new(file)).await?
                }
                None => import::export_term_labels(pool, corpus_id, io::stdout().lock()).await?,
            };
            info!("Wrote {} labels", written);
        }
    }

    Ok(())
}
