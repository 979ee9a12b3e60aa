//! Subcommand implementations

use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;
use serde::Serialize;

use crate::pipeline::{
    save_training_table, synthetic, unknown_keys, FeatureSchema, ModelKind, Record,
};
use crate::report::{export_training_reports, TrainingMetrics, TrainingReport, TrainingSummary};
use crate::service::{ModelService, TRAINED};
use crate::store::ModelStore;
use crate::utils::{
    create_spinner, finish_with_failure, finish_with_success, metric_line, print_banner,
    print_completion, print_info, print_step_header, print_step_time, print_success,
    print_train_config, print_warning, warning_line,
};

/// Train the selected models (all when `models` is empty) and print a summary
pub fn run_train<S: ModelStore>(
    service: &ModelService<S>,
    models: &[ModelKind],
    model_location: &str,
    report_path: Option<&Path>,
) -> Result<()> {
    let kinds: Vec<ModelKind> = if models.is_empty() {
        ModelKind::ALL.to_vec()
    } else {
        ModelKind::ALL
            .into_iter()
            .filter(|k| models.contains(k))
            .collect()
    };

    print_banner(env!("CARGO_PKG_VERSION"));
    let names: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
    print_train_config(
        Path::new(model_location),
        service.config().samples,
        service.config().seed,
        &names,
    );

    let mut reports = Vec::with_capacity(kinds.len());
    for (step, kind) in kinds.iter().enumerate() {
        let step_start = Instant::now();
        print_step_header(step as u8 + 1, &format!("Train {} model", kind));

        match service.config().data_path(*kind) {
            Some(path) if path.exists() => print_info(&format!("Data: {}", path.display())),
            Some(path) => print_warning(&format!(
                "{} not found, using synthetic data",
                path.display()
            )),
            None => print_info("Data: synthetic"),
        }

        let spinner = create_spinner(&format!("Fitting {} pipeline...", kind));
        let report = match service.train(*kind) {
            Ok(report) => report,
            Err(e) => {
                finish_with_failure(&spinner, &format!("Training {} failed", kind));
                return Err(e).with_context(|| format!("Failed to train {} model", kind));
            }
        };
        finish_with_success(&spinner, &format!("{} bundle stored", kind));

        for line in report_metric_lines(&report.metrics) {
            println!("{}", line);
        }
        print_step_time(step_start.elapsed());
        reports.push(report);
    }

    let summary = TrainingSummary::new(reports);
    summary.display();

    if let Some(path) = report_path {
        export_training_reports(&summary.reports, model_location, path)?;
        print_success(&format!("Training report written to {}", path.display()));
    }

    for report in &summary.reports {
        print_success(&format!("{}: {}", report.kind, TRAINED));
    }
    print_completion();
    Ok(())
}

/// Metric lines logged after a model is trained
fn report_metric_lines(metrics: &TrainingMetrics) -> Vec<String> {
    match metrics {
        TrainingMetrics::Regression { r2_train, r2_test } => vec![
            metric_line("R² train", *r2_train),
            metric_line("R² test", *r2_test),
        ],
        TrainingMetrics::Classification {
            auc,
            accuracy,
            positive_rate,
        } => vec![
            metric_line("AUC", *auc),
            metric_line("Accuracy", *accuracy),
            metric_line("Churn rate", *positive_rate),
        ],
        TrainingMetrics::Clustering {
            inertia,
            populations,
            ..
        } => std::iter::once(metric_line("Inertia", *inertia))
            .chain(populations.iter().map(|p| {
                format!(
                    "      {} {}: {} users ({:.1}%)",
                    style(p.cluster_id).yellow(),
                    p.name,
                    p.count,
                    p.percentage
                )
            }))
            .collect(),
    }
}

/// Score one record and print the result as JSON on stdout
pub fn run_score<S: ModelStore>(
    service: &ModelService<S>,
    model: ModelKind,
    json: Option<&str>,
    input: Option<&Path>,
) -> Result<()> {
    let raw = match (json, input) {
        (Some(json), _) => json.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read record from {}", path.display()))?,
        (None, None) => bail!("A record is required. Use --json or --input."),
    };
    let record = parse_record(&raw)?;

    if !service.store().contains(model) {
        eprintln!(
            "    {} No {} bundle at {}, training first",
            style("◆").cyan().bold(),
            model,
            service.store().location(model)
        );
    }

    // stdout carries only the score JSON, notes go to stderr
    let output = match model {
        ModelKind::Pricing => {
            let (bundle, trained) = service.load_or_train_pricing()?;
            note_scoring(&bundle.schema, &record, trained.as_ref());
            to_json(&bundle.score(&record))?
        }
        ModelKind::Churn => {
            let (bundle, trained) = service.load_or_train_churn()?;
            note_scoring(&bundle.schema, &record, trained.as_ref());
            to_json(&bundle.score(&record))?
        }
        ModelKind::Clustering => {
            let (bundle, trained) = service.load_or_train_clustering()?;
            note_scoring(&bundle.schema, &record, trained.as_ref());
            to_json(&bundle.score(&record))?
        }
    };
    println!("{}", output);
    Ok(())
}

/// Log the metrics of an on-demand training run and the record fields the
/// model ignores
fn note_scoring(schema: &FeatureSchema, record: &Record, trained: Option<&TrainingReport>) {
    if let Some(report) = trained {
        eprintln!(
            "    {} {} model trained on {} rows",
            style("✓").green().bold(),
            report.kind,
            report.rows
        );
        for line in report_metric_lines(&report.metrics) {
            eprintln!("{}", line);
        }
    }

    let ignored = unknown_keys(record, schema);
    if !ignored.is_empty() {
        eprintln!(
            "{}",
            warning_line(&format!("Ignoring unknown field(s): {}", ignored.join(", ")))
        );
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize score")
}

/// Parse a JSON object into a scoring record.
///
/// Numbers are taken as-is, booleans become 1/0 and nulls are treated as
/// absent. An empty object is rejected.
pub fn parse_record(raw: &str) -> Result<Record> {
    let value: serde_json::Value =
        serde_json::from_str(raw).context("Record is not valid JSON")?;
    let Some(object) = value.as_object() else {
        bail!("Record must be a JSON object");
    };
    if object.is_empty() {
        bail!(crate::ModelError::EmptyRecord);
    }

    let mut record = Record::with_capacity(object.len());
    for (key, value) in object {
        let number = match value {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            serde_json::Value::Null => continue,
            _ => None,
        };
        match number {
            Some(v) => {
                record.insert(key.clone(), v);
            }
            None => bail!("Field '{}' is not numeric", key),
        }
    }
    Ok(record)
}

/// Write a synthetic training table for `model` to `output`
pub fn run_generate(model: ModelKind, output: &Path, samples: usize, seed: u64) -> Result<()> {
    let spinner = create_spinner(&format!("Generating {} rows of {} data...", samples, model));
    let table = synthetic::generate(model, samples, seed)?;
    save_training_table(&table, model, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    finish_with_success(
        &spinner,
        &format!(
            "{} rows x {} columns written to {}",
            table.n_rows(),
            table.schema.len() + usize::from(table.labels.is_some()),
            output.display()
        ),
    );
    Ok(())
}

/// Print a table of stored bundles
pub fn run_status<S: ModelStore>(service: &ModelService<S>) -> Result<()> {
    let statuses = service.status()?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Model").add_attribute(Attribute::Bold),
        Cell::new("Status").add_attribute(Attribute::Bold),
        Cell::new("Trained at").add_attribute(Attribute::Bold),
        Cell::new("Metrics").add_attribute(Attribute::Bold),
        Cell::new("Location").add_attribute(Attribute::Bold),
    ]);

    for status in &statuses {
        let (state, color) = if status.is_corrupt() {
            ("corrupt", Color::Red)
        } else if status.is_trained() {
            ("trained", Color::Green)
        } else {
            ("missing", Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(status.kind).add_attribute(Attribute::Bold),
            Cell::new(state).fg(color),
            Cell::new(
                status
                    .trained_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(
                status
                    .report
                    .as_ref()
                    .map(|r| r.metrics.headline())
                    .or_else(|| status.problem.clone())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(&status.location),
        ]);
    }

    println!();
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_numbers_and_bools() {
        let record = parse_record(r#"{"demandScore": 8, "hasBalcony": true, "floor": null}"#).unwrap();
        assert_eq!(record["demandScore"], 8.0);
        assert_eq!(record["hasBalcony"], 1.0);
        assert!(!record.contains_key("floor"));
    }

    #[test]
    fn test_parse_record_rejects_bad_input() {
        assert!(parse_record("{}").is_err());
        assert!(parse_record("[1, 2]").is_err());
        assert!(parse_record(r#"{"season": "winter"}"#).is_err());
        assert!(parse_record("not json").is_err());
    }

    #[test]
    fn test_metric_lines_include_cluster_populations() {
        let metrics = TrainingMetrics::Clustering {
            inertia: 12.5,
            explained_variance_ratio: vec![0.6, 0.2],
            populations: vec![crate::report::ClusterPopulation {
                cluster_id: 0,
                name: "Active owners".to_string(),
                count: 40,
                percentage: 40.0,
            }],
        };
        let lines: Vec<String> = report_metric_lines(&metrics)
            .iter()
            .map(|l| console::strip_ansi_codes(l).to_string())
            .collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Inertia: 12.5000"));
        assert!(lines[1].contains("Active owners: 40 users (40.0%)"));
    }
}
