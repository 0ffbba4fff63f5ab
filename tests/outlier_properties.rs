use clarify_audit::analysis::outliers::modified_z_scores;
use clarify_audit::{
    classify_outliers, rollup_contest, select_outliers, sum_choice_votes, Choice, Contest,
    Jurisdiction, VoteResult, VoteTotals, DEFAULT_THRESHOLD,
};
use proptest::prelude::*;

fn contest() -> Contest {
    Contest::new(
        "C1",
        "Contest",
        vec![Choice::new("A", "A"), Choice::new("B", "B"), Choice::new("C", "C")],
        3,
    )
}

fn result_strategy() -> impl Strategy<Value = VoteResult> {
    (
        prop::sample::select(vec!["C1", "C2"]),
        prop::sample::select(vec!["A", "B", "C", "D"]),
        prop::sample::select(vec!["J1", "J2", "J3"]),
        0u64..10_000,
    )
        .prop_map(|(c, ch, j, votes)| VoteResult::new(c, ch, j, votes))
}

proptest! {
    #[test]
    fn classification_preserves_length(values in prop::collection::vec(-1e6f64..1e6, 0..200)) {
        let mask = classify_outliers(&values, DEFAULT_THRESHOLD).unwrap();
        prop_assert_eq!(mask.len(), values.len());
    }

    #[test]
    fn identical_values_have_no_outliers(value in -1e6f64..1e6, n in 0usize..100) {
        let values = vec![value; n];
        let mask = classify_outliers(&values, DEFAULT_THRESHOLD).unwrap();
        prop_assert!(mask.iter().all(|o| !o));
    }

    #[test]
    fn scores_are_finite(values in prop::collection::vec(-1e6f64..1e6, 0..100)) {
        if let Some(scores) = modified_z_scores(&values).unwrap() {
            prop_assert!(scores.iter().all(|z| z.is_finite() && *z >= 0.0));
        }
    }

    #[test]
    fn farther_point_scores_at_least_as_high(
        cluster in prop::collection::vec(49.0f64..51.0, 5..40),
        near in 0.0f64..100.0,
        extra in 0.0f64..100.0,
    ) {
        // Place two points on the same side of the cluster; the farther one
        // must never be flagged when the nearer one is not.
        let a = 51.0 + near;
        let b = a + extra;
        let mut values = cluster;
        values.push(a);
        values.push(b);
        let mask = classify_outliers(&values, DEFAULT_THRESHOLD).unwrap();
        let n = values.len();
        prop_assert!(!mask[n - 2] || mask[n - 1]);
    }

    #[test]
    fn select_returns_ordered_subset(values in prop::collection::vec(-1e3f64..1e3, 0..100)) {
        let rows: Vec<usize> = (0..values.len()).collect();
        let selected = select_outliers(&rows, &values, DEFAULT_THRESHOLD).unwrap();
        prop_assert!(selected.len() <= rows.len());
        prop_assert!(selected.windows(2).all(|w| w[0] < w[1]));
        let mask = classify_outliers(&values, DEFAULT_THRESHOLD).unwrap();
        for index in &selected {
            prop_assert!(mask[*index]);
        }
        prop_assert_eq!(selected.len(), mask.iter().filter(|o| **o).count());
    }

    #[test]
    fn select_rejects_length_mismatch(n in 0usize..50, m in 0usize..50) {
        prop_assume!(n != m);
        let rows = vec![0u8; n];
        let values = vec![1.0f64; m];
        prop_assert!(select_outliers(&rows, &values, DEFAULT_THRESHOLD).is_err());
    }

    #[test]
    fn rollup_matches_choice_sums(
        results in prop::collection::vec(result_strategy(), 0..60),
        ballots in 1u64..50_000,
    ) {
        let contest = contest();
        let jurisdiction = Jurisdiction::new("J1", ballots, ballots * 2);
        let rollup = rollup_contest(&results, &contest, &jurisdiction).unwrap();

        let expected: u64 = contest
            .choices
            .iter()
            .map(|choice| sum_choice_votes(&results, &contest, choice, &jurisdiction))
            .sum();
        prop_assert_eq!(rollup.total_choice_votes, expected);
        prop_assert_eq!(rollup.residual_votes, ballots as i64 - expected as i64);
        let pct = rollup.residual_votes as f64 * 100.0 / ballots as f64;
        prop_assert!((rollup.residual_pct - pct).abs() < 1e-9);
    }

    #[test]
    fn vote_totals_agree_with_scan(results in prop::collection::vec(result_strategy(), 0..60)) {
        let contest = contest();
        let totals = VoteTotals::from_results(&results);
        for name in &["J1", "J2", "J3", "J4"] {
            let jurisdiction = Jurisdiction::new(name, 100_000, 200_000);
            for choice in &contest.choices {
                prop_assert_eq!(
                    totals.choice_votes(&contest, choice, &jurisdiction),
                    sum_choice_votes(&results, &contest, choice, &jurisdiction)
                );
            }
            prop_assert_eq!(
                totals.rollup_contest(&contest, &jurisdiction),
                rollup_contest(&results, &contest, &jurisdiction)
            );
        }
    }
}
