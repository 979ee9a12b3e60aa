//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::ModelKind;
use crate::service::TrainConfig;

/// casaml - Train and score pricing, churn and user segmentation models
#[derive(Parser, Debug)]
#[command(name = "casaml")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the trained model bundles
    #[arg(long, global = true, env = "CASAML_MODEL_DIR", default_value = "models")]
    pub model_dir: PathBuf,

    /// Number of synthetic rows generated when no training CSV is used
    #[arg(long, global = true, default_value = "1000", value_parser = validate_samples)]
    pub samples: usize,

    /// Seed for synthetic data generation
    #[arg(long, global = true, default_value = "42")]
    pub seed: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train models and store their bundles
    Train {
        /// Models to train (comma-separated). Default: all three
        #[arg(long, value_delimiter = ',', value_parser = parse_model_kind)]
        models: Vec<ModelKind>,

        /// Training CSV for the pricing model (label column `optimalPriceChange`).
        /// Synthetic data is used when the file does not exist.
        #[arg(long)]
        pricing_data: Option<PathBuf>,

        /// Training CSV for the churn model (label column `churn`)
        #[arg(long)]
        churn_data: Option<PathBuf>,

        /// Training CSV for the clustering model (no label column)
        #[arg(long)]
        clustering_data: Option<PathBuf>,

        /// Write the training reports as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Score one JSON record; trains the model first if it has no bundle
    Score {
        /// Model to score against: pricing, churn or cluster
        #[arg(value_parser = parse_model_kind)]
        model: ModelKind,

        /// Record as an inline JSON object, e.g. '{"demandScore": 8}'
        #[arg(long, conflicts_with = "input", required_unless_present = "input")]
        json: Option<String>,

        /// File containing the record as a JSON object
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Write a synthetic training table to CSV
    Generate {
        /// Model whose training table to generate
        #[arg(value_parser = parse_model_kind)]
        model: ModelKind,

        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show which models have stored bundles
    Status,
}

impl Cli {
    /// Training configuration for the current invocation
    pub fn train_config(&self) -> TrainConfig {
        let mut config = TrainConfig {
            samples: self.samples,
            seed: self.seed,
            ..TrainConfig::default()
        };
        if let Commands::Train {
            pricing_data,
            churn_data,
            clustering_data,
            ..
        } = &self.command
        {
            config.pricing_data = pricing_data.clone();
            config.churn_data = churn_data.clone();
            config.clustering_data = clustering_data.clone();
        }
        config
    }
}

/// Value parser for model names
fn parse_model_kind(s: &str) -> Result<ModelKind, String> {
    s.parse()
}

/// Validator for samples parameter
fn validate_samples(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid row count", s))?;

    if value < 10 {
        Err(format!("samples must be at least 10, got {}", value))
    } else {
        Ok(value)
    }
}
