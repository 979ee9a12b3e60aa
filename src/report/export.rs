//! Training report export functionality

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use super::training_report::TrainingReport;

/// Metadata about the training run
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    /// Timestamp of the export (ISO 8601 format)
    pub timestamp: String,
    /// casaml version
    pub casaml_version: String,
    /// Directory or store the bundles were written to
    pub model_location: String,
}

/// Complete training export with metadata
#[derive(Serialize)]
pub struct TrainingExport<'a> {
    pub metadata: RunMetadata,
    pub models: &'a [TrainingReport],
}

/// Export training reports to a JSON file with run metadata
///
/// # Arguments
/// * `reports` - Reports of the models trained in this run
/// * `model_location` - Where the bundles were stored
/// * `output_path` - Path to write the JSON file
pub fn export_training_reports(
    reports: &[TrainingReport],
    model_location: &str,
    output_path: &Path,
) -> Result<()> {
    let export = TrainingExport {
        metadata: RunMetadata {
            timestamp: Utc::now().to_rfc3339(),
            casaml_version: env!("CARGO_PKG_VERSION").to_string(),
            model_location: model_location.to_string(),
        },
        models: reports,
    };

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize training reports to JSON")?;

    std::fs::write(output_path, json).with_context(|| {
        format!(
            "Failed to write training reports to {}",
            output_path.display()
        )
    })?;

    Ok(())
}
