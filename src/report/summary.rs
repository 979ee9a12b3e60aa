//! Training summary report generation

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use super::training_report::{TrainingMetrics, TrainingReport};

/// Summary of one `train` run
#[derive(Debug, Default)]
pub struct TrainingSummary {
    pub reports: Vec<TrainingReport>,
}

impl TrainingSummary {
    pub fn new(reports: Vec<TrainingReport>) -> Self {
        Self { reports }
    }

    /// Main table: one row per model
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Model").add_attribute(Attribute::Bold),
            Cell::new("Source").add_attribute(Attribute::Bold),
            Cell::new("Rows").add_attribute(Attribute::Bold),
            Cell::new("Train / Test").add_attribute(Attribute::Bold),
            Cell::new("Metrics").add_attribute(Attribute::Bold),
            Cell::new("Time").add_attribute(Attribute::Bold),
        ]);

        for report in &self.reports {
            table.add_row(vec![
                Cell::new(report.kind).fg(Color::Cyan).add_attribute(Attribute::Bold),
                Cell::new(&report.source),
                Cell::new(report.rows),
                Cell::new(format!("{} / {}", report.train_rows, report.test_rows)),
                Cell::new(report.metrics.headline()).fg(metric_color(&report.metrics)),
                Cell::new(format_duration(report.duration_ms)),
            ]);
        }
        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("TRAINING SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        // Indent the table
        for line in self.table().to_string().lines() {
            println!("    {}", line);
        }

        for report in &self.reports {
            if let TrainingMetrics::Clustering { populations, .. } = &report.metrics {
                println!();
                println!(
                    "    {} {}",
                    style("👥").cyan(),
                    style("CLUSTER POPULATIONS").white().bold()
                );
                println!("    {}", style("─".repeat(50)).dim());
                for p in populations {
                    println!(
                        "      {} {:<22} {:>6} {}",
                        style(p.cluster_id).yellow().bold(),
                        p.name,
                        p.count,
                        style(format!("({:.1}%)", p.percentage)).dim()
                    );
                }
            }
        }
    }
}

/// Green for strong fits, yellow for usable ones, red otherwise
fn metric_color(metrics: &TrainingMetrics) -> Color {
    let quality = match metrics {
        TrainingMetrics::Regression { r2_test, .. } => *r2_test,
        TrainingMetrics::Classification { auc, .. } => *auc,
        TrainingMetrics::Clustering { .. } => return Color::White,
    };
    if quality > 0.8 {
        Color::Green
    } else if quality > 0.6 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn format_duration(ms: u64) -> String {
    if ms >= 1000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        format!("{}ms", ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{DataSource, ModelKind};

    #[test]
    fn test_table_has_row_per_report() {
        let report = TrainingReport {
            kind: ModelKind::Churn,
            source: DataSource::Synthetic {
                samples: 100,
                seed: 42,
            },
            rows: 100,
            features: 7,
            train_rows: 80,
            test_rows: 20,
            metrics: TrainingMetrics::Classification {
                auc: 0.91,
                accuracy: 0.85,
                positive_rate: 0.4,
            },
            duration_ms: 1500,
        };
        let summary = TrainingSummary::new(vec![report.clone(), report]);
        let rendered = summary.table().to_string();

        assert_eq!(rendered.matches("churn").count(), 2);
        assert!(rendered.contains("80 / 20"));
        assert!(rendered.contains("1.50s"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(12), "12ms");
        assert_eq!(format_duration(2500), "2.50s");
    }

    #[test]
    fn test_metric_color_thresholds() {
        let good = TrainingMetrics::Regression {
            r2_train: 1.0,
            r2_test: 0.9,
        };
        let weak = TrainingMetrics::Regression {
            r2_train: 1.0,
            r2_test: 0.2,
        };
        assert_eq!(metric_color(&good), Color::Green);
        assert_eq!(metric_color(&weak), Color::Red);
    }
}
