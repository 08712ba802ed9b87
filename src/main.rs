use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;

use ragchat::chat::ChatAgent;
use ragchat::config::AppConfig;
use ragchat::llm::{LlmProvider, OpenAiProvider};
use ragchat::rag::{Ingestion, SqliteRagStore};
use ragchat::{logging, rag::store::RagStore};

struct CliArgs {
    config_path: PathBuf,
    ingest_dir: Option<PathBuf>,
    question: Option<String>,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut config_path = PathBuf::from("config.yml");
    let mut ingest_dir = None;
    let mut question_parts: Vec<String> = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config_path = args
                    .next()
                    .map(PathBuf::from)
                    .ok_or("--config requires a path")?;
            }
            "--ingest" => {
                ingest_dir = Some(
                    args.next()
                        .map(PathBuf::from)
                        .ok_or("--ingest requires a directory")?,
                );
            }
            "--help" | "-h" => {
                return Err("usage: ragchat [--config PATH] [--ingest DIR] [QUESTION]".to_string());
            }
            other => question_parts.push(other.to_string()),
        }
    }

    let question = if question_parts.is_empty() {
        None
    } else {
        Some(question_parts.join(" "))
    };

    Ok(CliArgs {
        config_path,
        ingest_dir,
        question,
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::FAILURE;
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> anyhow::Result<()> {
    let config = AppConfig::load(&args.config_path).context("loading configuration")?;
    logging::init(&config.logging);

    let store: Arc<dyn RagStore> = Arc::new(
        SqliteRagStore::open(&config.retrieval.db_path)
            .await
            .context("opening vector store")?,
    );
    let llm: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::new(
        config.llm.base_url.clone(),
        config.api_key(),
    ));

    if !llm.health_check().await.unwrap_or(false) {
        tracing::warn!(base_url = %config.llm.base_url, "llm endpoint not reachable");
    }

    // Ingestion runs first and to completion; chat never overlaps it.
    if let Some(input_dir) = &args.ingest_dir {
        let ingestion = Ingestion::new(
            store.clone(),
            llm.clone(),
            config.llm.embedding_model.clone(),
            config.ingestion.clone(),
        );
        let chunks = ingestion
            .ingest_folder(input_dir)
            .await
            .context("ingesting documents")?;
        println!("ingested {} chunks from {}", chunks, input_dir.display());
    }

    if let Some(question) = &args.question {
        let agent = ChatAgent::new(&config, store, llm).context("building chat agent")?;
        let state = agent.ask(question).await.context("running workflow")?;

        match state.generation {
            Some(generation) => println!("{}", generation),
            None => anyhow::bail!("workflow finished without a generation"),
        }
    } else if args.ingest_dir.is_none() {
        anyhow::bail!("nothing to do: pass a question, --ingest, or both");
    }

    Ok(())
}
