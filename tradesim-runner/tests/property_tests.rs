//! Property tests for aggregation invariants.

use proptest::prelude::*;
use tradesim_core::{analyze, SimulationConfig, Sizing};
use tradesim_runner::{aggregate, median};

fn arb_config() -> impl Strategy<Value = SimulationConfig> {
    (
        0.0..=1.0_f64,
        0.5..10.0_f64,
        prop_oneof![
            (1.0..50.0_f64).prop_map(Sizing::FixedAmount),
            (0.5..5.0_f64).prop_map(Sizing::PercentOfBalance),
        ],
        1usize..40,
        1usize..10,
        1usize..40,
        any::<u64>(),
    )
        .prop_map(
            |(win_rate, risk_to_reward, sizing, num_trades, concurrent_trades, num_runs, seed)| {
                SimulationConfig {
                    initial_capital: 1000.0,
                    win_rate,
                    risk_to_reward,
                    sizing,
                    num_trades,
                    concurrent_trades,
                    num_runs,
                    seed: Some(seed),
                }
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn extremes_bound_all_finals(config in arb_config()) {
        let result = aggregate(&config).unwrap();
        for t in &result.all_trajectories {
            let last = *t.last().unwrap();
            prop_assert!(result.best.final_balance() >= last);
            prop_assert!(result.worst.final_balance() <= last);
        }
    }

    #[test]
    fn median_matches_columns(config in arb_config()) {
        let result = aggregate(&config).unwrap();
        prop_assert_eq!(result.median.len(), config.num_trades);
        for i in 0..config.num_trades {
            let column: Vec<f64> = result.all_trajectories.iter().map(|t| t[i]).collect();
            prop_assert_eq!(result.median[i], median(&column).unwrap());
        }
    }

    #[test]
    fn reported_streaks_within_trade_count(config in arb_config()) {
        let result = aggregate(&config).unwrap();
        for outcomes in [&result.best.outcomes, &result.worst.outcomes, &result.representative] {
            let s = analyze(outcomes);
            prop_assert!(s.max_consecutive_wins + s.max_consecutive_losses <= config.num_trades);
        }
    }
}
