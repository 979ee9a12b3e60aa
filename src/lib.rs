//! casaml: pricing, churn and user segmentation models
//!
//! Three independently trained pipelines share one lifecycle: build a
//! training table (CSV or synthetic), fit, persist the fitted bundle, then
//! score single records against it.
//!
//! ```no_run
//! use casaml::{FsModelStore, ModelService, Record, TrainConfig};
//!
//! let service = ModelService::new(FsModelStore::new("models"), TrainConfig::default());
//! let record: Record = [("demandScore".to_string(), 8.0)].into_iter().collect();
//! let score = service.score_pricing(&record)?;
//! println!("{:+.2}%", score.recommended_price_change_percent);
//! # Ok::<(), casaml::ModelError>(())
//! ```

pub mod cli;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod service;
pub mod store;
pub mod utils;

pub use error::{ModelError, Result};
pub use pipeline::{FeatureSchema, ModelKind, Record};
pub use service::{ModelService, ModelStatus, TrainConfig};
pub use store::{FsModelStore, MemoryModelStore, ModelStore};
