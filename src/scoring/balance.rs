//! Two-state balance index (TSBI).
//!
//! Rewards groups that perform evenly against both reference states:
//! `balance = 1 - |A - B| / (A + B)` and `tsbi = balance * (A + B)`.

use serde::{Deserialize, Serialize};

/// Balance reported when one side has no usable score.
pub const UNDEFINED_BALANCE: f64 = -1.0;

/// Balance and weighted score for one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceScore {
    /// In `[0, 1]` when defined, otherwise [`UNDEFINED_BALANCE`]
    pub balance: f64,
    pub tsbi: f64,
}

impl BalanceScore {
    pub fn is_defined(&self) -> bool {
        self.balance >= 0.0
    }

    /// Balance clamped for plotting: the undefined sentinel renders as zero.
    pub fn display_balance(&self) -> f64 {
        self.balance.max(0.0)
    }
}

/// Compute the balance of two per-reference scores.
///
/// Either side at or below zero yields the undefined sentinel with a TSBI of
/// zero.
pub fn calc_balance(score_a: f64, score_b: f64) -> BalanceScore {
    if score_a <= 0.0 || score_b <= 0.0 {
        return BalanceScore {
            balance: UNDEFINED_BALANCE,
            tsbi: 0.0,
        };
    }
    let total = score_a + score_b;
    let balance = (1.0 - (score_a - score_b).abs() / total).clamp(0.0, 1.0);
    BalanceScore {
        balance,
        tsbi: balance * total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_performance_is_fully_balanced() {
        let score = calc_balance(0.6, 0.6);
        assert_eq!(score.balance, 1.0);
        assert!((score.tsbi - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_lopsided_performance() {
        let score = calc_balance(0.9, 0.1);
        assert!((score.balance - 0.2).abs() < 1e-12);
        assert!((score.tsbi - 0.2).abs() < 1e-12);
        assert!(score.is_defined());
    }

    #[test]
    fn test_missing_side_is_undefined() {
        for (a, b) in [(0.0, 0.5), (0.5, 0.0), (0.0, 0.0)] {
            let score = calc_balance(a, b);
            assert_eq!(score.balance, UNDEFINED_BALANCE);
            assert_eq!(score.tsbi, 0.0);
            assert!(!score.is_defined());
            assert_eq!(score.display_balance(), 0.0);
        }
    }
}
