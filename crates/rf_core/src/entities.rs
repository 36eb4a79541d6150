//! Immutable round entities: the project/metric table and voter ballots.
//!
//! The registry's `projects` vector order is the **canonical order**: every
//! score, allocation, and result vector in the engine is indexed by position
//! in that vector, and it is the tie-break order for allocation passes.

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::CoreError;
use crate::tokens::{MetricId, ProjectId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One candidate project: its id, open-source flag, and raw metric values.
/// A metric absent from the map reads as 0 (it is not an error).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProjectRecord {
    pub project_id: ProjectId,
    pub is_oss: bool,
    pub metrics: BTreeMap<MetricId, f64>,
}

impl ProjectRecord {
    /// Raw value for `metric`; missing values are defined to be 0.
    pub fn metric(&self, metric: &MetricId) -> f64 {
        self.metrics.get(metric).copied().unwrap_or(0.0)
    }
}

/// The Project × Metric table for one round. `metrics` lists the declared
/// columns; values keyed by undeclared metrics are ignored by the engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProjectRegistry {
    pub metrics: Vec<MetricId>,
    pub projects: Vec<ProjectRecord>,
}

impl ProjectRegistry {
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn project_ids(&self) -> impl Iterator<Item = &ProjectId> {
        self.projects.iter().map(|p| &p.project_id)
    }

    /// Domain checks: at least one project, unique project ids, unique
    /// declared metrics, and all declared metric values finite and ≥ 0.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.projects.is_empty() {
            return Err(CoreError::EmptyRegistry);
        }
        let mut seen_projects = BTreeSet::new();
        for p in &self.projects {
            if !seen_projects.insert(&p.project_id) {
                return Err(CoreError::DuplicateProject);
            }
        }
        let mut seen_metrics = BTreeSet::new();
        for m in &self.metrics {
            if !seen_metrics.insert(m) {
                return Err(CoreError::DuplicateMetric);
            }
        }
        for p in &self.projects {
            for m in &self.metrics {
                let v = p.metric(m);
                if !v.is_finite() || v < 0.0 {
                    return Err(CoreError::DomainOutOfRange("metric value"));
                }
            }
        }
        Ok(())
    }
}

/// One voter's input: per-metric weights (already divided by 100; each in
/// [0,1], need not sum to 1) plus a non-negative open-source multiplier.
/// Weights keyed by metrics unknown to the registry are valid and simply
/// contribute nothing.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ballot {
    pub weights: BTreeMap<MetricId, f64>,
    pub os_multiplier: f64,
}

impl Ballot {
    /// Weight for `metric`; unlisted metrics weigh 0.
    pub fn weight(&self, metric: &MetricId) -> f64 {
        self.weights.get(metric).copied().unwrap_or(0.0)
    }

    /// Domain checks: weights in [0,1] and finite; multiplier finite, ≥ 0.
    pub fn validate(&self) -> Result<(), CoreError> {
        for w in self.weights.values() {
            if !w.is_finite() || !(0.0..=1.0).contains(w) {
                return Err(CoreError::DomainOutOfRange("ballot weight"));
            }
        }
        if !self.os_multiplier.is_finite() || self.os_multiplier < 0.0 {
            return Err(CoreError::DomainOutOfRange("os_multiplier"));
        }
        Ok(())
    }
}
