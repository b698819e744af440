//! Import commands - load model artifacts and comparison matrices

use std::path::PathBuf;

use clap::Args;

use crate::infrastructure::services::{
    ImportComparisonRequest, ImportModelRequest, IngestionService, IngestionServiceTrait,
};

#[derive(Args, Debug)]
pub struct ImportModelArgs {
    /// Path of the trained LDA artifact (JSON)
    pub path: PathBuf,

    /// Unique model name
    pub name: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value = "")]
    pub training_context: String,

    /// Flag the model as the default one
    #[arg(long)]
    pub main: bool,
}

#[derive(Args, Debug)]
pub struct ImportComparisonArgs {
    /// Path of the comparison matrix (JSON 2-D array, rows = topics of MODEL_FROM)
    pub path: PathBuf,

    /// Comparison name, stored slugified
    pub name: String,

    pub description: String,

    #[arg(allow_negative_numbers = true)]
    pub lower_bound: f64,

    #[arg(allow_negative_numbers = true)]
    pub upper_bound: f64,

    pub model_from: String,

    pub model_to: String,

    /// The matrix holds distances rather than similarity scores
    #[arg(long)]
    pub distance: bool,
}

async fn ingestion_service() -> anyhow::Result<IngestionService> {
    let config = super::load_config()?;
    super::init_console_logging(&config);

    let store = super::open_store(&config).await?;
    Ok(IngestionService::new(store).with_top_n_topic_terms(config.topics.top_n_topic_terms))
}

pub async fn run_model(args: ImportModelArgs) -> anyhow::Result<()> {
    let service = ingestion_service().await?;

    let request = ImportModelRequest::new(args.name)
        .with_description(args.description)
        .with_training_context(args.training_context)
        .with_main(args.main);
    let model = service.import_model(&args.path, request).await?;

    println!("Imported model \"{}\" (id {})", model.name(), model.id());
    Ok(())
}

pub async fn run_comparison(args: ImportComparisonArgs) -> anyhow::Result<()> {
    let service = ingestion_service().await?;

    let request = ImportComparisonRequest {
        name: args.name,
        description: args.description,
        is_score: !args.distance,
        lower_bound: args.lower_bound,
        upper_bound: args.upper_bound,
        model_from: args.model_from,
        model_to: args.model_to,
    };
    let comparison = service.import_comparison(&args.path, request).await?;

    println!(
        "Imported comparison \"{}\" (id {})",
        comparison.name, comparison.id
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::cli::{Cli, Command};

    #[test]
    fn test_parse_import_comparison() {
        let cli = Cli::try_parse_from([
            "topic-evolution-api",
            "import-comparison",
            "matrix.json",
            "Cosine 2019-2020",
            "cosine similarity",
            "-1",
            "1",
            "lda-2019",
            "lda-2020",
            "--distance",
        ])
        .unwrap();

        match cli.command {
            Command::ImportComparison(args) => {
                assert_eq!(args.lower_bound, -1.0);
                assert_eq!(args.model_to, "lda-2020");
                assert!(args.distance);
            }
            _ => panic!("expected import-comparison"),
        }
    }

    #[test]
    fn test_parse_import_model() {
        let cli = Cli::try_parse_from([
            "topic-evolution-api",
            "import-model",
            "model.json",
            "lda-2020",
            "--training-context",
            "arXiv",
            "--main",
        ])
        .unwrap();

        match cli.command {
            Command::ImportModel(args) => {
                assert_eq!(args.name, "lda-2020");
                assert_eq!(args.training_context, "arXiv");
                assert!(args.description.is_empty());
                assert!(args.main);
            }
            _ => panic!("expected import-model"),
        }
    }
}
