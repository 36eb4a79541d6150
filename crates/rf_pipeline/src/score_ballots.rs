//! SCORE stage: one capped allocation per ballot.
//!
//! For each ballot, in input order: normalize the metric columns under the
//! ballot's open-source multiplier, combine them under the ballot's
//! weights, then run the capped proportional allocator over the full
//! budget. Every row is a complete would-be round as seen by that voter.

use rf_core::{Ballot, Params, ProjectRegistry};

use rf_algo::{allocate_capped, normalize_columns, score_projects};

/// Per-ballot capped allocations, one row per ballot, each row in
/// canonical project order.
pub fn score_ballots(
    registry: &ProjectRegistry,
    ballots: &[Ballot],
    params: &Params,
) -> Vec<Vec<f64>> {
    ballots
        .iter()
        .map(|ballot| {
            let columns = normalize_columns(registry, ballot.os_multiplier);
            let scores = score_projects(&columns, ballot);
            allocate_capped(&scores, params.total_funding, params.max_cap)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_core::{MetricId, ProjectRecord, SurplusMode};

    fn mid(s: &str) -> MetricId {
        s.parse().unwrap()
    }

    fn registry() -> ProjectRegistry {
        let row = |id: &str, oss: bool, gas: f64| ProjectRecord {
            project_id: id.parse().unwrap(),
            is_oss: oss,
            metrics: [(mid("gas_fees"), gas)].into_iter().collect(),
        };
        ProjectRegistry {
            metrics: vec![mid("gas_fees")],
            projects: vec![row("a", false, 50.0), row("b", false, 30.0), row("c", false, 20.0)],
        }
    }

    fn params() -> Params {
        Params {
            total_funding: 100.0,
            max_cap: 40.0,
            min_cap: 10.0,
            surplus: SurplusMode::SinglePass,
        }
    }

    #[test]
    fn one_ballot_yields_its_capped_allocation() {
        let ballot = Ballot {
            weights: [(mid("gas_fees"), 1.0)].into_iter().collect(),
            os_multiplier: 1.0,
        };
        let rows = score_ballots(&registry(), &[ballot], &params());
        assert_eq!(rows.len(), 1);
        // Shares 0.5/0.3/0.2 of 100 with a cap of 40: a caps, surplus
        // flows proportionally to b and c.
        assert_eq!(rows[0][0], 40.0);
        assert!((rows[0][1] - 36.0).abs() < 1e-9);
        assert!((rows[0][2] - 24.0).abs() < 1e-9);
    }

    #[test]
    fn ballot_with_no_overlap_allocates_nothing() {
        let ballot = Ballot {
            weights: [(mid("users"), 1.0)].into_iter().collect(),
            os_multiplier: 1.0,
        };
        let rows = score_ballots(&registry(), &[ballot], &params());
        assert_eq!(rows[0], vec![0.0, 0.0, 0.0]);
    }
}
