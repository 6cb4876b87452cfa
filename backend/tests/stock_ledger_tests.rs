//! Stock ledger tests
//!
//! The ledger is append-only: balances are derived by folding entries,
//! and a movement is only admitted when it keeps the balance at or above
//! zero. These tests pin down the arithmetic the services rely on.

use proptest::prelude::*;
use shared::models::MovementType;

/// Fold a sequence of movements into a balance.
fn balance(entries: &[(MovementType, i32)]) -> i64 {
    entries
        .iter()
        .map(|(movement_type, quantity)| movement_type.signed(*quantity))
        .sum()
}

/// Admit a movement only if the resulting balance stays non-negative,
/// mirroring the store's `stock >= quantity` guard on decrements.
fn try_apply(
    entries: &mut Vec<(MovementType, i32)>,
    movement_type: MovementType,
    quantity: i32,
) -> bool {
    if quantity <= 0 {
        return false;
    }
    if movement_type == MovementType::Out && balance(entries) < i64::from(quantity) {
        return false;
    }
    entries.push((movement_type, quantity));
    true
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_balance_of_empty_ledger() {
        assert_eq!(balance(&[]), 0);
    }

    #[test]
    fn test_balance_mixed_movements() {
        let entries = [
            (MovementType::In, 50),
            (MovementType::In, 30),
            (MovementType::Out, 20),
            (MovementType::In, 10),
            (MovementType::Out, 15),
        ];
        // 50 + 30 - 20 + 10 - 15 = 55
        assert_eq!(balance(&entries), 55);
    }

    #[test]
    fn test_out_movement_rejected_beyond_balance() {
        let mut entries = vec![(MovementType::In, 10)];
        assert!(!try_apply(&mut entries, MovementType::Out, 11));
        assert!(try_apply(&mut entries, MovementType::Out, 10));
        assert_eq!(balance(&entries), 0);
    }

    #[test]
    fn test_non_positive_quantities_rejected() {
        let mut entries = Vec::new();
        assert!(!try_apply(&mut entries, MovementType::In, 0));
        assert!(!try_apply(&mut entries, MovementType::Out, -3));
        assert!(entries.is_empty());
    }

    #[test]
    fn test_sale_estorno_pair_is_neutral() {
        // a sale followed by its estorno cancels out
        let mut entries = vec![(MovementType::In, 25)];
        assert!(try_apply(&mut entries, MovementType::Out, 4));
        assert!(try_apply(&mut entries, MovementType::In, 4));
        assert_eq!(balance(&entries), 25);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// The balance equals the signed sum of all admitted entries and
    /// never goes negative, whatever movements are attempted.
    #[test]
    fn prop_admitted_ledger_never_negative(
        attempts in proptest::collection::vec((any::<bool>(), -5..40i32), 0..100)
    ) {
        let mut entries = Vec::new();
        for (incoming, quantity) in attempts {
            let movement_type = if incoming { MovementType::In } else { MovementType::Out };
            try_apply(&mut entries, movement_type, quantity);
            prop_assert!(balance(&entries) >= 0);
        }

        let expected: i64 = entries
            .iter()
            .map(|(movement_type, quantity)| movement_type.signed(*quantity))
            .sum();
        prop_assert_eq!(balance(&entries), expected);
    }

    /// Appending an entry never changes the contribution of earlier
    /// entries (the ledger is append-only: history is stable).
    #[test]
    fn prop_history_prefix_is_stable(
        quantities in proptest::collection::vec(1..50i32, 1..30)
    ) {
        let mut entries = Vec::new();
        let mut prefix_balances = Vec::new();

        for quantity in quantities {
            prefix_balances.push(balance(&entries));
            try_apply(&mut entries, MovementType::In, quantity);
        }

        // recomputing each prefix gives the same values
        for (i, expected) in prefix_balances.iter().enumerate() {
            prop_assert_eq!(balance(&entries[..i]), *expected);
        }
    }
}
