//! Analyze command - prints the most probable topics of a text

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use crate::infrastructure::analysis::EnglishPreprocessor;
use crate::infrastructure::lda::ArtifactTopicScorer;
use crate::infrastructure::services::{TextAnalysisService, TextAnalysisServiceTrait};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Text to analyze; read from --file when omitted
    pub text: Option<String>,

    #[arg(long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Model name; the main model when omitted
    #[arg(long)]
    pub model: Option<String>,
}

pub async fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;
    super::init_console_logging(&config);

    let text = match (args.text, args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => tokio::fs::read_to_string(&path).await?,
        (None, None) => anyhow::bail!("Provide a text or --file"),
    };

    let store = super::open_store(&config).await?;
    let service = TextAnalysisService::new(
        store,
        Arc::new(EnglishPreprocessor::new(config.topics.minimum_words_per_text)),
        Arc::new(ArtifactTopicScorer::new()),
    )
    .with_top_n(config.topics.top_n_document_topics);

    let analysis = service.analyze(&text, args.model.as_deref()).await?;
    println!("{}", serde_json::to_string_pretty(&analysis)?);

    Ok(())
}
