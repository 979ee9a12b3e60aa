//! casaml: train and score pricing, churn and user segmentation models

use anyhow::Result;
use clap::Parser;

use casaml::cli::{run_generate, run_score, run_status, run_train, Cli, Commands};
use casaml::{FsModelStore, ModelService};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.train_config();
    let store = FsModelStore::new(&cli.model_dir);
    let service = ModelService::new(store, config);

    match &cli.command {
        Commands::Train { models, report, .. } => {
            let location = cli.model_dir.display().to_string();
            run_train(&service, models, &location, report.as_deref())
        }
        Commands::Score { model, json, input } => {
            run_score(&service, *model, json.as_deref(), input.as_deref())
        }
        Commands::Generate { model, output } => run_generate(*model, output, cli.samples, cli.seed),
        Commands::Status => run_status(&service),
    }
}
