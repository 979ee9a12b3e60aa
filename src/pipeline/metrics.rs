//! Evaluation metrics reported after training

use ndarray::Array1;

/// Coefficient of determination.
///
/// Returns 0.0 when the targets are constant and the predictions are not
/// perfect, 1.0 when they are.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let mean = y_true.mean().unwrap_or(0.0);
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean) * (t - mean)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Area under the ROC curve via the Mann-Whitney U statistic.
///
/// Tied scores receive their average rank. Returns 0.5 when only one class is
/// present.
pub fn roc_auc(y_true: &Array1<f64>, scores: &Array1<f64>) -> f64 {
    let mut pairs: Vec<(f64, bool)> = scores
        .iter()
        .zip(y_true.iter())
        .map(|(&s, &y)| (s, y >= 0.5))
        .collect();

    let total_pos = pairs.iter().filter(|(_, p)| *p).count() as f64;
    let total_neg = pairs.len() as f64 - total_pos;
    if total_pos == 0.0 || total_neg == 0.0 {
        return 0.5;
    }

    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n = pairs.len();
    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && pairs[j].0 == pairs[i].0 {
            j += 1;
        }
        // ranks i+1..=j share their mean
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let positives = pairs[i..j].iter().filter(|(_, p)| *p).count() as f64;
        rank_sum_pos += avg_rank * positives;
        i = j;
    }

    let u = rank_sum_pos - total_pos * (total_pos + 1.0) / 2.0;
    (u / (total_pos * total_neg)).clamp(0.0, 1.0)
}

/// Share of probabilities on the right side of `threshold`
pub fn accuracy(y_true: &Array1<f64>, probabilities: &Array1<f64>, threshold: f64) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(probabilities.iter())
        .filter(|&(&y, &p)| (p > threshold) == (y >= 0.5))
        .count();
    correct as f64 / y_true.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_r2_perfect_and_mean_prediction() {
        let y = array![1.0, 2.0, 3.0, 4.0];
        assert!((r2_score(&y, &y) - 1.0).abs() < 1e-12);

        let mean_pred = array![2.5, 2.5, 2.5, 2.5];
        assert!(r2_score(&y, &mean_pred).abs() < 1e-12);
    }

    #[test]
    fn test_r2_can_be_negative() {
        let y = array![1.0, 2.0, 3.0];
        let bad = array![3.0, 2.0, 1.0];
        assert!(r2_score(&y, &bad) < 0.0);
    }

    #[test]
    fn test_auc_perfect_separation() {
        let y = array![0.0, 0.0, 1.0, 1.0];
        let s = array![0.1, 0.2, 0.8, 0.9];
        assert!((roc_auc(&y, &s) - 1.0).abs() < 1e-12);

        let reversed = array![0.9, 0.8, 0.2, 0.1];
        assert!(roc_auc(&y, &reversed).abs() < 1e-12);
    }

    #[test]
    fn test_auc_with_ties() {
        let y = array![0.0, 1.0, 0.0, 1.0];
        let s = array![0.5, 0.5, 0.5, 0.5];
        assert!((roc_auc(&y, &s) - 0.5).abs() < 1e-12);

        let y = array![0.0, 1.0, 0.0, 1.0];
        let s = array![0.1, 0.4, 0.5, 0.8];
        assert!((roc_auc(&y, &s) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_auc_single_class() {
        let y = array![1.0, 1.0];
        let s = array![0.3, 0.9];
        assert_eq!(roc_auc(&y, &s), 0.5);
    }

    #[test]
    fn test_accuracy_threshold_is_strict() {
        let y = array![1.0, 0.0, 1.0, 0.0];
        let p = array![0.9, 0.5, 0.5, 0.1];
        // 0.5 is not above the threshold, so it counts as class 0
        assert!((accuracy(&y, &p, 0.5) - 0.75).abs() < 1e-12);
    }
}
