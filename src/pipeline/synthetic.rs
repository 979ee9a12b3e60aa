//! Synthetic training data
//!
//! When no real dataset is supplied, each model is trained on a procedurally
//! generated table whose feature distributions mimic plausible platform data
//! and whose label follows a closed-form rule plus noise. Generation is fully
//! determined by `(kind, samples, seed)`.

use ndarray::{Array1, Array2};
use rand::distributions::{Distribution, Uniform, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Exp, Gamma, Normal};

use super::align::FeatureSchema;
use super::kind::ModelKind;
use super::table::{DataSource, TrainingTable};
use crate::error::{ModelError, Result};

/// Default number of synthetic rows per model
pub const DEFAULT_SAMPLES: usize = 1000;

/// Default generator seed
pub const DEFAULT_SEED: u64 = 42;

/// Seasonal price multiplier applied to the simulated current price (season 1-4)
const SEASONAL_PRICE_FACTOR: [f64; 4] = [1.1, 0.9, 0.8, 1.0];

/// Seasonal contribution to the optimal price change (season 1-4)
const SEASONAL_ADJUSTMENT: [f64; 4] = [0.05, -0.03, -0.07, 0.02];

/// Generate a reproducible training table for `kind`.
pub fn generate(kind: ModelKind, samples: usize, seed: u64) -> Result<TrainingTable> {
    let mut rng = StdRng::seed_from_u64(seed);

    let (columns, labels) = match kind {
        ModelKind::Pricing => {
            let (columns, labels) = pricing_columns(&mut rng, samples)
                .map_err(|e| ModelError::training(kind, e))?;
            (columns, Some(labels))
        }
        ModelKind::Churn => {
            let (columns, labels) =
                churn_columns(&mut rng, samples).map_err(|e| ModelError::training(kind, e))?;
            (columns, Some(labels))
        }
        ModelKind::Clustering => {
            let columns = clustering_columns(&mut rng, samples)
                .map_err(|e| ModelError::training(kind, e))?;
            (columns, None)
        }
    };

    let features = Array2::from_shape_fn((samples, columns.len()), |(i, j)| columns[j][i]);

    Ok(TrainingTable {
        schema: FeatureSchema::new(kind.default_features().iter().copied()),
        features,
        labels: labels.map(Array1::from_vec),
        source: DataSource::Synthetic { samples, seed },
    })
}

fn draw<D: Distribution<f64>>(rng: &mut StdRng, dist: D, n: usize) -> Vec<f64> {
    (0..n).map(|_| dist.sample(rng)).collect()
}

fn draw_int(rng: &mut StdRng, low: i64, high: i64, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(low..high) as f64).collect()
}

/// Exponential draws with the given mean
fn draw_exp(rng: &mut StdRng, mean: f64, n: usize) -> std::result::Result<Vec<f64>, String> {
    let dist = Exp::new(1.0 / mean).map_err(|e| e.to_string())?;
    Ok(draw(rng, dist, n))
}

fn truncate(values: Vec<f64>) -> Vec<f64> {
    values.into_iter().map(f64::trunc).collect()
}

type Columns = Vec<Vec<f64>>;

fn pricing_columns(
    rng: &mut StdRng,
    n: usize,
) -> std::result::Result<(Columns, Vec<f64>), String> {
    let location_score = draw(rng, Uniform::new(1.0, 10.0), n);
    let square_meters = draw(rng, Uniform::new(20.0, 150.0), n);
    let room_count = draw_int(rng, 1, 5, n);
    let has_balcony = draw_int(rng, 0, 2, n);
    let floor = draw_int(rng, 0, 10, n);
    let building_age = draw(rng, Uniform::new(0.0, 50.0), n);
    let demand_score = draw(rng, Uniform::new(1.0, 10.0), n);
    let season = draw_int(rng, 1, 5, n);

    let mut current_price = Vec::with_capacity(n);
    let mut optimal_change = Vec::with_capacity(n);

    for i in 0..n {
        let season_idx = (season[i] as usize) - 1;
        let base_price = (300.0
            + location_score[i] * 50.0
            + square_meters[i] * 8.0
            + room_count[i] * 100.0
            + has_balcony[i] * 50.0
            - building_age[i] * 5.0
            + floor[i] * 10.0
            + demand_score[i] * 30.0)
            * SEASONAL_PRICE_FACTOR[season_idx];

        let noise = Normal::new(0.0, base_price * 0.05).map_err(|e| e.to_string())?;
        current_price.push(base_price + noise.sample(rng));

        let change = (demand_score[i] - 5.0) * 0.02 + SEASONAL_ADJUSTMENT[season_idx];
        optimal_change.push(change * 100.0);
    }

    let columns = vec![
        location_score,
        square_meters,
        room_count,
        has_balcony,
        floor,
        building_age,
        demand_score,
        season,
        current_price,
    ];
    Ok((columns, optimal_change))
}

fn churn_columns(rng: &mut StdRng, n: usize) -> std::result::Result<(Columns, Vec<f64>), String> {
    let days_since_last_login = truncate(draw_exp(rng, 20.0, n)?);
    let days_active_last_month = draw_int(rng, 0, 31, n);
    let total_properties_viewed = truncate(draw_exp(rng, 30.0, n)?);
    let messages_sent = truncate(draw_exp(rng, 10.0, n)?);
    let properties_listed = truncate(draw_exp(rng, 3.0, n)?);
    let subscription_months = truncate(draw_exp(rng, 6.0, n)?);

    let avg_daily_activity: Vec<f64> = total_properties_viewed
        .iter()
        .zip(days_active_last_month.iter())
        .map(|(viewed, active)| viewed / active.max(1.0))
        .collect();

    let churn: Vec<f64> = (0..n)
        .map(|i| {
            let p = churn_probability(
                days_since_last_login[i],
                days_active_last_month[i],
                total_properties_viewed[i],
                messages_sent[i],
                properties_listed[i],
                subscription_months[i],
            );
            if rng.gen::<f64>() < p {
                1.0
            } else {
                0.0
            }
        })
        .collect();

    let columns = vec![
        days_since_last_login,
        days_active_last_month,
        total_properties_viewed,
        avg_daily_activity,
        messages_sent,
        properties_listed,
        subscription_months,
    ];
    Ok((columns, churn))
}

/// Ground-truth churn probability used to label synthetic users
fn churn_probability(
    days_since_last_login: f64,
    days_active_last_month: f64,
    total_properties_viewed: f64,
    messages_sent: f64,
    properties_listed: f64,
    subscription_months: f64,
) -> f64 {
    let p = 0.1
        + days_since_last_login * 0.01
        + (30.0 - days_active_last_month) * 0.01
        + (-total_properties_viewed / 20.0).exp() * 0.2
        + (-messages_sent / 10.0).exp() * 0.2
        + (-properties_listed / 2.0).exp() * 0.2
        + (-subscription_months / 6.0).exp() * 0.3;
    p.clamp(0.0, 1.0)
}

fn clustering_columns(rng: &mut StdRng, n: usize) -> std::result::Result<Columns, String> {
    // Viewing activity
    let properties_viewed_monthly = truncate(draw_exp(rng, 20.0, n)?);
    let view_duration = Normal::new(120.0, 40.0).map_err(|e| e.to_string())?;
    let avg_view_duration_sec = draw(rng, view_duration, n);
    let search_count_monthly = truncate(draw_exp(rng, 15.0, n)?);

    // Messaging
    let msg_sent_monthly = truncate(draw_exp(rng, 10.0, n)?);
    let response_rate = Beta::new(2.0, 2.0).map_err(|e| e.to_string())?;
    let msg_response_rate = draw(rng, response_rate, n);
    let avg_response_time_hrs = draw_exp(rng, 5.0, n)?;

    // Listings
    let properties_listed = truncate(draw_exp(rng, 2.0, n)?);
    let completeness = Beta::new(5.0, 2.0).map_err(|e| e.to_string())?;
    let listing_completeness = draw(rng, completeness, n);
    let listing_updates_monthly = truncate(draw_exp(rng, 3.0, n)?);

    // Profile and account
    let login_frequency_weekly = truncate(draw_exp(rng, 3.0, n)?);
    let session = Gamma::new(3.0, 5.0).map_err(|e| e.to_string())?;
    let session_duration_min = draw(rng, session, n);
    let profile = Beta::new(2.0, 1.0).map_err(|e| e.to_string())?;
    let completed_profile = draw(rng, profile, n);

    // Free, Standard, Premium
    let tiers = WeightedIndex::new([0.7, 0.2, 0.1]).map_err(|e| e.to_string())?;
    let subscription_tier: Vec<f64> = (0..n).map(|_| tiers.sample(rng) as f64).collect();
    let days_since_registration = truncate(draw_exp(rng, 180.0, n)?);

    Ok(vec![
        properties_viewed_monthly,
        avg_view_duration_sec,
        search_count_monthly,
        msg_sent_monthly,
        msg_response_rate,
        avg_response_time_hrs,
        properties_listed,
        listing_completeness,
        listing_updates_monthly,
        login_frequency_weekly,
        session_duration_min,
        completed_profile,
        subscription_tier,
        days_since_registration,
    ])
}
