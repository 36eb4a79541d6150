//! Property tests for the capped proportional allocator and the stages
//! built on top of it: budget conservation, cap respect, zero-score
//! safety, and unanimity idempotence across the median pass.

use proptest::prelude::*;

use rf_algo::{allocate_capped, median_by_project};

const REL: f64 = 1e-9;

fn score_vecs() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..1000.0, 1..40)
}

proptest! {
    #[test]
    fn budget_is_conserved_when_any_score_is_nonzero(
        scores in score_vecs(),
        budget in 0.0f64..1_000_000.0,
        cap_frac in 0.0f64..1.5,
    ) {
        // Keep the budget distributable: cap × (nonzero projects) must be
        // able to hold it, else the tail legitimately underflows.
        let nz = scores.iter().filter(|&&s| s > 0.0).count().max(1) as f64;
        let cap = (budget / nz) * (1.0 + cap_frac);
        let awards = allocate_capped(&scores, budget, cap);

        prop_assert!(awards.iter().all(|a| a.is_finite()));
        if scores.iter().any(|&s| s > 0.0) {
            let total: f64 = awards.iter().sum();
            prop_assert!(
                (total - budget).abs() <= REL * budget.max(1.0),
                "sum {} != budget {}", total, budget
            );
        } else {
            prop_assert!(awards.iter().all(|&a| a == 0.0));
        }
    }

    #[test]
    fn awards_respect_the_cap_and_are_non_negative(
        scores in score_vecs(),
        budget in 0.0f64..1_000_000.0,
        cap in 0.0f64..100_000.0,
    ) {
        let awards = allocate_capped(&scores, budget, cap);
        for &a in &awards {
            prop_assert!(a >= 0.0);
            prop_assert!(a <= cap);
        }
    }

    #[test]
    fn zero_score_projects_always_get_zero(
        mut scores in score_vecs(),
        budget in 0.0f64..1_000_000.0,
        cap in 0.0f64..100_000.0,
        zero_at in any::<prop::sample::Index>(),
    ) {
        let i = zero_at.index(scores.len());
        scores[i] = 0.0;
        let awards = allocate_capped(&scores, budget, cap);
        prop_assert_eq!(awards[i], 0.0);
    }

    #[test]
    fn unanimous_ballots_reproduce_their_vector(
        scores in score_vecs(),
        ballots in 1usize..9,
    ) {
        let budget = 1_000.0;
        let n = scores.len() as f64;
        let cap = budget / n * 2.0;

        let row = allocate_capped(&scores, budget, cap);
        let rows: Vec<Vec<f64>> = (0..ballots).map(|_| row.clone()).collect();

        // Median of identical vectors is that vector.
        let median = median_by_project(&rows).unwrap();
        prop_assert_eq!(&median, &row);

        // Re-running the allocator on it reproduces it (within float slop):
        // the vector is already capped and conserving, so the proportional
        // walk hands every project its own share back.
        let again = allocate_capped(&median, budget, cap);
        for (a, b) in again.iter().zip(&row) {
            prop_assert!((a - b).abs() <= 1e-6 * budget);
        }
    }
}
