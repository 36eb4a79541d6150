//! Per-metric normalization with the ballot's open-source multiplier.
//!
//! Contract:
//! - Each declared metric column is scaled **independently** so it sums to 1
//!   across all projects.
//! - Before scaling, every OSS project's raw value is multiplied by the
//!   ballot's `os_multiplier`; non-OSS values are unchanged.
//! - A column whose (multiplied) total is 0 normalizes to all zeros — an
//!   explicit branch, never 0/0 → NaN.
//!
//! Pure function of its inputs; columns are aligned to canonical project
//! order.

use std::collections::BTreeMap;

use rf_core::{MetricId, ProjectRegistry};

/// Normalized metric columns for one ballot. Each column has
/// `project_count` entries in canonical project order and sums to 1
/// (or is all zero).
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedColumns {
    pub project_count: usize,
    pub columns: BTreeMap<MetricId, Vec<f64>>,
}

/// Normalize every declared metric column of `registry` under
/// `os_multiplier`.
pub fn normalize_columns(registry: &ProjectRegistry, os_multiplier: f64) -> NormalizedColumns {
    let n = registry.len();
    let mut columns = BTreeMap::new();

    for metric in &registry.metrics {
        let mut col: Vec<f64> = registry
            .projects
            .iter()
            .map(|p| {
                let raw = p.metric(metric);
                if p.is_oss {
                    raw * os_multiplier
                } else {
                    raw
                }
            })
            .collect();

        let total: f64 = col.iter().sum();
        if total > 0.0 {
            for v in &mut col {
                *v /= total;
            }
        } else {
            // Dead column (all zero, or zeroed by a 0 multiplier on an
            // all-OSS column): defined as all zeros.
            col.iter_mut().for_each(|v| *v = 0.0);
        }
        columns.insert(metric.clone(), col);
    }

    NormalizedColumns {
        project_count: n,
        columns,
    }
}
