use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rag_walkthrough::application::{IndexingService, RagService, Retriever};
use rag_walkthrough::domain::ports::{Embedder, IndexBuilder};
use rag_walkthrough::infrastructure::{
    load_source, AppConfig, IndexBackend, InMemoryIndexBuilder, OpenAiChat, OpenAiClient,
    OpenAiEmbedder, QdrantIndexBuilder, SourceKind,
};

const DEFAULT_QUESTION: &str = "What are the different categories of prompts?";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "rag_walkthrough=info".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let mut args = std::env::args().skip(1);
    let source = PathBuf::from(
        args.next()
            .context("usage: rag-walkthrough <source.txt|source.pdf> [question...]")?,
    );
    let rest: Vec<String> = args.collect();
    let question = if rest.is_empty() {
        DEFAULT_QUESTION.to_string()
    } else {
        rest.join(" ")
    };

    let config = AppConfig::from_env()?;
    let settings = &config.config;

    let client = OpenAiClient::new(&settings.openai)?;
    let embedder = Arc::new(OpenAiEmbedder::from_config(client.clone(), &settings.embedding));
    let generator = Arc::new(OpenAiChat::from_config(client, &settings.llm));

    let builder: Arc<dyn IndexBuilder> = match settings.index.backend {
        IndexBackend::InMemory => Arc::new(InMemoryIndexBuilder::new(settings.index.metric)),
        IndexBackend::Qdrant => Arc::new(QdrantIndexBuilder::new(
            &settings.index.qdrant_url,
            &settings.index.collection,
            embedder.dimension(),
            settings.index.metric,
        )?),
    };
    let indexing = IndexingService::new(embedder.clone(), builder, settings.chunking.splitter()?)
        .with_batch_size(settings.embedding.batch_size);
    let documents = load_source(&source, SourceKind::from_path(&source)).await?;
    let index = indexing.index_documents(&documents).await?;
    info!(entries = index.len(), source = %source.display(), "index ready");

    let retriever = Retriever::new(embedder, index).with_top_k(settings.rag.top_k);
    let rag = RagService::new(retriever, generator, config.prompts.rag.template()?);

    let answer = rag.answer(&question).await?;

    println!("Question: {question}\n");
    for (i, chunk) in answer.sources.iter().enumerate() {
        match chunk.metadata.page {
            Some(page) => println!("[{}] {} (page {page})", i + 1, chunk.metadata.source),
            None => println!("[{}] {}", i + 1, chunk.metadata.source),
        }
    }
    println!("\n{}", answer.answer);

    Ok(())
}
