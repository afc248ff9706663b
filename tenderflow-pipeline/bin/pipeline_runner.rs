use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tenderflow_llm::gateway::ModelGateway;
use tenderflow_llm::openai::OpenAIGateway;
use tenderflow_pipeline::{
    config, DocumentNormalizer, InMemoryProjectStore, MediaIngestion, PipelineEvent,
    ProjectLocks, ProposalSynthesizer, QuestionAnalyzer,
};
use tenderflow_types::{new_id, Media, Project};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config file (TOML); falls back to environment variables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project name used in logs
    #[arg(long, default_value = "demo project")]
    name: String,

    /// Document URLs to ingest (repeatable)
    #[arg(long = "doc-url", required = true)]
    doc_urls: Vec<String>,

    /// Instruction prepended to the question-synthesis prompt
    #[arg(long, default_value = "Generate clarification questions a contractor would ask before writing a proposal.")]
    generation_prompt: String,

    /// Rules for analyzing generated questions
    #[arg(long, default_value = "")]
    analysis_rules: String,

    /// System prompt for proposal synthesis; empty uses the default
    #[arg(long, default_value = "")]
    proposal_template: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_target(false),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::PipelineConfig::from_env()?,
    };

    let gateway: Arc<dyn ModelGateway> = Arc::new(
        OpenAIGateway::with_timeout(
            config.openai.api_key.clone(),
            Duration::from_secs(config.openai.request_timeout_secs),
        )?
        .with_base_url(config.openai.base_url.clone())
        .with_default_model(config.openai.model.clone()),
    );

    let store = Arc::new(InMemoryProjectStore::new());
    let normalizer = Arc::new(DocumentNormalizer::new(&config.stirling)?);
    let locks = ProjectLocks::new();
    let (events, mut event_rx) = tenderflow_pipeline::event_channel();

    let project_id = new_id();
    store.insert_project(Project {
        id: project_id.clone(),
        name: args.name.clone(),
        generation_prompt: args.generation_prompt.clone(),
        qualification_rules: String::new(),
        analysis_rules: args.analysis_rules.clone(),
        proposal_template: args.proposal_template.clone(),
        questions: vec![],
        proposal_result: String::new(),
    });
    for url in &args.doc_urls {
        store.insert_media(Media {
            id: new_id(),
            project_id: project_id.clone(),
            url: Some(url.clone()),
            object_key: String::new(),
            filename: String::new(),
            content_type: String::new(),
            content: String::new(),
        });
    }

    let ingestion = MediaIngestion::new(
        store.clone(),
        gateway.clone(),
        normalizer,
        locks.clone(),
        Some(events),
        config.media_base_url.clone(),
    );

    println!("Ingesting {} document(s)...", args.doc_urls.len());
    ingestion.run(&project_id).await?;

    // Ingestion triggers question synthesis in the background; wait for its
    // outcome before moving on.
    match event_rx.recv().await {
        Some(PipelineEvent::QuestionSynthesisCompleted { question_count, .. }) => {
            println!("Generated {} question(s)", question_count);
        }
        Some(PipelineEvent::QuestionSynthesisFailed { message, .. }) => {
            anyhow::bail!("question synthesis failed: {}", message);
        }
        other => anyhow::bail!("unexpected pipeline event: {:?}", other),
    }

    let analyzer = QuestionAnalyzer::new(
        store.clone(),
        gateway.clone(),
        locks.clone(),
        config.analysis_max_in_flight,
    );
    let questions = analyzer.run(&project_id).await?;
    for (i, q) in questions.iter().enumerate() {
        println!("\n[{}] {}", i + 1, q.question);
        if !q.analysis.is_empty() {
            println!("    analysis: {}", q.analysis);
        }
    }

    let proposal = ProposalSynthesizer::new(store.clone(), gateway, locks)
        .run(&project_id)
        .await?;
    println!("\n--- proposal ---\n{}", proposal);

    Ok(())
}
