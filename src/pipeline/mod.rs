//! Pipeline module - data preparation and estimators shared by all models

pub mod align;
pub mod estimators;
pub mod kind;
pub mod loader;
pub mod metrics;
pub mod scaler;
pub mod synthetic;
pub mod table;

pub use align::{align, unknown_keys, FeatureSchema, Record, SCHEMA_VERSION};
pub use kind::ModelKind;
pub use loader::{load_or_generate, load_training_table, save_training_table};
pub use metrics::{accuracy, r2_score, roc_auc};
pub use scaler::StandardScaler;
pub use table::{train_test_split, DataSource, Split, TrainingTable};
