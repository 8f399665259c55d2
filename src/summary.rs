// src/summary.rs

use serde::Serialize;

use crate::types::{Prediction, PredictionSet};

/// Churn split of one prediction set. Never stored, recomputed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub churn_count: usize,
    pub no_churn_count: usize,
    /// Percent of all records, one decimal place. `0.0` when there is no data.
    pub churn_pct: f64,
    pub no_churn_pct: f64,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.churn_count + self.no_churn_count
    }

    /// True when there was nothing to summarise.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

pub fn summarize(predictions: &PredictionSet) -> Summary {
    let churn_count = predictions
        .iter()
        .filter(|p| p.prediction() == Prediction::Churn)
        .count();
    let no_churn_count = predictions
        .iter()
        .filter(|p| p.prediction() == Prediction::NoChurn)
        .count();
    let total = churn_count + no_churn_count;

    Summary {
        churn_count,
        no_churn_count,
        churn_pct: percent(churn_count, total),
        no_churn_pct: percent(no_churn_count, total),
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(count as f64 / total as f64 * 100.0)
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
