//! Load-or-train orchestration over a [`ModelStore`]
//!
//! Scoring calls load the persisted bundle for their model; when none exists
//! yet the model is trained first (real CSV if configured and present,
//! synthetic data otherwise) and the new bundle is stored.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::error::{ModelError, Result};
use crate::models::{ChurnBundle, ChurnScore, ClusterBundle, ClusterScore, PricingBundle, PricingScore};
use crate::pipeline::synthetic::{DEFAULT_SAMPLES, DEFAULT_SEED};
use crate::pipeline::{load_or_generate, ModelKind, Record, TrainingTable};
use crate::report::TrainingReport;
use crate::store::{bundle_info, load_or_none, store_bundle, Bundle, ModelStore};

/// Status string reported for every trained model
pub const TRAINED: &str = "trained";

/// Where training data comes from
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    /// Rows generated when no CSV is used
    pub samples: usize,
    /// Seed for synthetic data
    pub seed: u64,
    pub pricing_data: Option<PathBuf>,
    pub churn_data: Option<PathBuf>,
    pub clustering_data: Option<PathBuf>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            seed: DEFAULT_SEED,
            pricing_data: None,
            churn_data: None,
            clustering_data: None,
        }
    }
}

impl TrainConfig {
    pub fn data_path(&self, kind: ModelKind) -> Option<&PathBuf> {
        match kind {
            ModelKind::Pricing => self.pricing_data.as_ref(),
            ModelKind::Churn => self.churn_data.as_ref(),
            ModelKind::Clustering => self.clustering_data.as_ref(),
        }
    }
}

/// Stored state of one model, as shown by `casaml status`
#[derive(Debug, Clone)]
pub struct ModelStatus {
    pub kind: ModelKind,
    pub location: String,
    pub trained_at: Option<DateTime<Utc>>,
    pub report: Option<TrainingReport>,
    /// Why a stored bundle could not be read
    pub problem: Option<String>,
}

impl ModelStatus {
    pub fn is_trained(&self) -> bool {
        self.trained_at.is_some()
    }

    pub fn is_corrupt(&self) -> bool {
        self.problem.is_some()
    }
}

pub struct ModelService<S: ModelStore> {
    store: S,
    config: TrainConfig,
}

impl<S: ModelStore> ModelService<S> {
    pub fn new(store: S, config: TrainConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Table the next training run of `kind` will use
    pub fn training_table(&self, kind: ModelKind) -> Result<TrainingTable> {
        load_or_generate(
            kind,
            self.config.data_path(kind).map(PathBuf::as_path),
            self.config.samples,
            self.config.seed,
        )
    }

    /// Train `kind` from scratch and replace its stored bundle
    pub fn train(&self, kind: ModelKind) -> Result<TrainingReport> {
        match kind {
            ModelKind::Pricing => self.train_pricing().map(|b| b.report),
            ModelKind::Churn => self.train_churn().map(|b| b.report),
            ModelKind::Clustering => self.train_clustering().map(|b| b.report),
        }
    }

    /// Train every selected model; an empty selection trains all of them
    pub fn train_all(&self, selection: &[ModelKind]) -> Result<BTreeMap<ModelKind, &'static str>> {
        self.train_with_reports(selection).map(|reports| {
            reports
                .into_iter()
                .map(|report| (report.kind, TRAINED))
                .collect()
        })
    }

    /// Like [`Self::train_all`] but returns the training reports, in training order
    pub fn train_with_reports(&self, selection: &[ModelKind]) -> Result<Vec<TrainingReport>> {
        let kinds: Vec<ModelKind> = if selection.is_empty() {
            ModelKind::ALL.to_vec()
        } else {
            ModelKind::ALL
                .into_iter()
                .filter(|k| selection.contains(k))
                .collect()
        };
        kinds.into_iter().map(|kind| self.train(kind)).collect()
    }

    pub fn train_pricing(&self) -> Result<PricingBundle> {
        let bundle = PricingBundle::train(&self.training_table(ModelKind::Pricing)?)?;
        store_bundle(&self.store, &bundle)?;
        Ok(bundle)
    }

    pub fn train_churn(&self) -> Result<ChurnBundle> {
        let bundle = ChurnBundle::train(&self.training_table(ModelKind::Churn)?)?;
        store_bundle(&self.store, &bundle)?;
        Ok(bundle)
    }

    pub fn train_clustering(&self) -> Result<ClusterBundle> {
        let bundle = ClusterBundle::train(&self.training_table(ModelKind::Clustering)?)?;
        store_bundle(&self.store, &bundle)?;
        Ok(bundle)
    }

    /// Stored pricing bundle, training one first if none exists.
    ///
    /// The report is `Some` only when this call trained the bundle.
    pub fn load_or_train_pricing(&self) -> Result<(PricingBundle, Option<TrainingReport>)> {
        self.load_or_train(|| self.train_pricing())
    }

    pub fn load_or_train_churn(&self) -> Result<(ChurnBundle, Option<TrainingReport>)> {
        self.load_or_train(|| self.train_churn())
    }

    pub fn load_or_train_clustering(&self) -> Result<(ClusterBundle, Option<TrainingReport>)> {
        self.load_or_train(|| self.train_clustering())
    }

    fn load_or_train<B: Bundle>(
        &self,
        train: impl FnOnce() -> Result<B>,
    ) -> Result<(B, Option<TrainingReport>)> {
        match load_or_none::<B>(&self.store)? {
            Some(bundle) => Ok((bundle, None)),
            None => {
                let bundle = train()?;
                let report = bundle.report().clone();
                Ok((bundle, Some(report)))
            }
        }
    }

    pub fn score_pricing(&self, record: &Record) -> Result<PricingScore> {
        Ok(self.load_or_train_pricing()?.0.score(record))
    }

    pub fn score_churn(&self, record: &Record) -> Result<ChurnScore> {
        Ok(self.load_or_train_churn()?.0.score(record))
    }

    pub fn score_cluster(&self, record: &Record) -> Result<ClusterScore> {
        Ok(self.load_or_train_clustering()?.0.score(record))
    }

    /// Stored state of every model.
    ///
    /// A corrupt bundle is reported on its own row; it does not hide the
    /// state of the other models.
    pub fn status(&self) -> Result<Vec<ModelStatus>> {
        ModelKind::ALL
            .into_iter()
            .map(|kind| -> Result<ModelStatus> {
                let mut status = ModelStatus {
                    kind,
                    location: self.store.location(kind),
                    trained_at: None,
                    report: None,
                    problem: None,
                };
                match bundle_info(&self.store, kind) {
                    Ok(Some(info)) => {
                        status.trained_at = Some(info.trained_at);
                        status.report = Some(info.report);
                    }
                    Ok(None) => {}
                    Err(ModelError::CorruptBundle { message, .. }) => status.problem = Some(message),
                    Err(e) => return Err(e),
                }
                Ok(status)
            })
            .collect()
    }
}
