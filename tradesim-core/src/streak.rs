//! Consecutive win/loss streaks of an outcome sequence.

use serde::{Deserialize, Serialize};

/// Longest runs of identical outcomes in one sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
}

/// Single pass over `outcomes`; `true` is a win.
pub fn analyze(outcomes: &[bool]) -> StreakSummary {
    let mut summary = StreakSummary::default();
    let mut current_wins = 0;
    let mut current_losses = 0;

    for &won in outcomes {
        if won {
            current_wins += 1;
            current_losses = 0;
        } else {
            current_losses += 1;
            current_wins = 0;
        }
        summary.max_consecutive_wins = summary.max_consecutive_wins.max(current_wins);
        summary.max_consecutive_losses = summary.max_consecutive_losses.max(current_losses);
    }

    summary
}
