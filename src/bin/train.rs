//! Offline trainer: generates a synthetic dataset, fits the models and
//! writes the artifact the service loads at startup.

use clap::Parser;
use petmatch::config::LoggingSettings;
use petmatch::core::generate_dataset;
use petmatch::ml::training::{summarize, write_training_csv};
use petmatch::ml::{train, TrainingConfig, TreeParams};
use petmatch::services::{ModelArtifact, ModelStore};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "petmatch-train", version, about = "Train the PetMatch compatibility model")]
struct Args {
    /// Number of synthetic samples to generate
    #[arg(long, default_value_t = 5000)]
    samples: usize,

    /// Seed for data generation and the train/test split
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Fraction of samples held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,

    #[arg(long, default_value_t = 10)]
    max_depth: usize,

    #[arg(long, default_value_t = 20)]
    min_samples_split: usize,

    /// Directory receiving the CSV, the model and its metrics
    #[arg(long, default_value = "models")]
    out_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    petmatch::logging::init(&LoggingSettings {
        level: "info".to_string(),
        format: "pretty".to_string(),
    });

    let args = Args::parse();

    info!("Generating {} synthetic samples (seed {})", args.samples, args.seed);
    let dataset = generate_dataset(args.samples, args.seed);

    if let Some(summary) = summarize(&dataset) {
        info!(
            "Dataset: {} samples, score range {:.2} - {:.2}, mean {:.2}",
            summary.count, summary.min, summary.max, summary.mean
        );
    }

    std::fs::create_dir_all(&args.out_dir)?;

    let csv_path = args.out_dir.join("training_data.csv");
    write_training_csv(&csv_path, &dataset)?;
    info!("Wrote training data to {}", csv_path.display());

    let config = TrainingConfig {
        test_size: args.test_size,
        split_seed: args.seed,
        tree: TreeParams {
            max_depth: args.max_depth,
            min_samples_split: args.min_samples_split,
            ..TreeParams::default()
        },
        ..TrainingConfig::default()
    };

    let trained = train(&dataset, &config)?;
    info!(
        "Trained on {} samples, evaluated on {}",
        trained.train_samples, trained.test_samples
    );

    let artifact = ModelArtifact::new(trained);
    ModelStore::new(args.out_dir.join("compatibility_model.json")).save(&artifact)?;

    let metrics_path = args.out_dir.join("model_metrics.json");
    std::fs::write(&metrics_path, serde_json::to_vec_pretty(&artifact.metrics)?)?;
    info!("Wrote metrics to {}", metrics_path.display());

    println!("\nTraining complete!");
    println!("  Model ID:             {}", artifact.model_id);
    println!("  Decision tree MSE:    {:.2}", artifact.metrics.decision_tree.mse);
    println!("  Decision tree R2:     {:.4}", artifact.metrics.decision_tree.r2_score);
    println!("  Logistic accuracy:    {:.4}", artifact.metrics.logistic_regression.accuracy);

    Ok(())
}
