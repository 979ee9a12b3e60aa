//! Dataset loader for CSV training tables

use std::fs::File;
use std::path::Path;

use ndarray::{Array1, Array2};
use polars::prelude::*;

use super::align::FeatureSchema;
use super::kind::ModelKind;
use super::synthetic;
use super::table::{DataSource, TrainingTable};
use crate::error::{ModelError, Result};

/// Load a training table for `kind` from a CSV file.
///
/// Every column except the model's label column becomes a feature, in file
/// order. All cells must be numeric and non-null.
pub fn load_training_table(path: &Path, kind: ModelKind) -> Result<TrainingTable> {
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()
        .and_then(|lf| lf.collect())
        .map_err(|e| ModelError::dataset(path, format!("failed to read CSV: {}", e)))?;

    if df.height() == 0 {
        return Err(ModelError::dataset(path, "file contains no data rows"));
    }

    let column_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let label_column = kind.label_column();
    if let Some(label) = label_column {
        if !column_names.iter().any(|c| c == label) {
            return Err(ModelError::MissingLabel {
                path: path.to_path_buf(),
                label: label.to_string(),
            });
        }
    }

    let feature_names: Vec<String> = column_names
        .iter()
        .filter(|c| Some(c.as_str()) != label_column)
        .cloned()
        .collect();

    if feature_names.is_empty() {
        return Err(ModelError::dataset(path, "no feature columns found"));
    }

    let columns: Vec<Vec<f64>> = feature_names
        .iter()
        .map(|name| numeric_column(&df, name, path))
        .collect::<Result<_>>()?;

    let labels = label_column
        .map(|label| numeric_column(&df, label, path).map(Array1::from_vec))
        .transpose()?;

    let features = Array2::from_shape_fn((df.height(), columns.len()), |(i, j)| columns[j][i]);

    Ok(TrainingTable {
        schema: FeatureSchema::new(feature_names),
        features,
        labels,
        source: DataSource::Csv {
            path: path.to_path_buf(),
        },
    })
}

/// Extract a column as `f64`, rejecting nulls and values that do not parse
fn numeric_column(df: &DataFrame, name: &str, path: &Path) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|e| ModelError::dataset(path, e.to_string()))?;
    let original_nulls = column.null_count();

    let float_col = column.cast(&DataType::Float64).map_err(|_| {
        ModelError::dataset(path, format!("column '{}' must be numeric", name))
    })?;

    if float_col.null_count() > 0 {
        let non_numeric = float_col.null_count() - original_nulls;
        return Err(ModelError::dataset(
            path,
            format!(
                "column '{}' has {} null and {} non-numeric value(s)",
                name, original_nulls, non_numeric
            ),
        ));
    }

    let ca = float_col
        .f64()
        .map_err(|e| ModelError::dataset(path, e.to_string()))?;

    Ok(ca.into_iter().map(|v| v.unwrap_or(0.0)).collect())
}

/// Load the CSV at `data_path` if it exists, otherwise synthesize a table.
///
/// A path that exists but cannot be parsed is an error, never a reason to fall
/// back to synthetic data.
pub fn load_or_generate(
    kind: ModelKind,
    data_path: Option<&Path>,
    samples: usize,
    seed: u64,
) -> Result<TrainingTable> {
    match data_path {
        Some(path) if path.exists() => load_training_table(path, kind),
        _ => synthetic::generate(kind, samples, seed),
    }
}

/// Write a training table (features then label) to CSV
pub fn save_training_table(table: &TrainingTable, kind: ModelKind, path: &Path) -> Result<()> {
    let mut columns: Vec<Column> = table
        .schema
        .iter()
        .enumerate()
        .map(|(j, name)| Column::new(name.into(), table.features.column(j).to_vec()))
        .collect();

    if let (Some(labels), Some(label)) = (&table.labels, kind.label_column()) {
        columns.push(Column::new(label.into(), labels.to_vec()));
    }

    let mut df = DataFrame::new(columns).map_err(|e| ModelError::dataset(path, e.to_string()))?;

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .finish(&mut df)
        .map_err(|e| ModelError::dataset(path, format!("failed to write CSV: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    #[test]
    fn test_load_csv_separates_label() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "churn.csv",
            "daysSinceLastLogin,churn,messagesSent\n3,0,10\n40,1,0\n7,0,4\n",
        );

        let table = load_training_table(&path, ModelKind::Churn).unwrap();
        assert_eq!(table.schema.features, vec!["daysSinceLastLogin", "messagesSent"]);
        assert_eq!(table.features.dim(), (3, 2));
        assert_eq!(table.labels.unwrap().to_vec(), vec![0.0, 1.0, 0.0]);
        assert_eq!(table.features[[1, 0]], 40.0);
    }

    #[test]
    fn test_missing_label_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "prices.csv", "locationScore,season\n1.0,2\n");

        let err = load_training_table(&path, ModelKind::Pricing).unwrap_err();
        assert!(matches!(err, ModelError::MissingLabel { .. }));
    }

    #[test]
    fn test_clustering_csv_has_no_label() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "users.csv", "a,b\n1,2\n3,4\n");

        let table = load_training_table(&path, ModelKind::Clustering).unwrap();
        assert!(table.labels.is_none());
        assert_eq!(table.schema.len(), 2);
    }

    #[test]
    fn test_non_numeric_cells_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "bad.csv", "a,churn\n1,0\nabc,1\n");

        let err = load_training_table(&path, ModelKind::Churn).unwrap_err();
        assert!(matches!(err, ModelError::Dataset { .. }), "got {:?}", err);
    }

    #[test]
    fn test_absent_path_falls_back_to_synthetic() {
        let table = load_or_generate(
            ModelKind::Pricing,
            Some(Path::new("/definitely/not/here.csv")),
            20,
            42,
        )
        .unwrap();
        assert_eq!(table.source, DataSource::Synthetic { samples: 20, seed: 42 });
    }

    #[test]
    fn test_save_then_load_preserves_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pricing.csv");
        let table = synthetic::generate(ModelKind::Pricing, 25, 42).unwrap();

        save_training_table(&table, ModelKind::Pricing, &path).unwrap();
        let loaded = load_training_table(&path, ModelKind::Pricing).unwrap();

        assert_eq!(loaded.schema, table.schema);
        assert_eq!(loaded.n_rows(), 25);
        assert!(loaded.labels.is_some());
    }
}
