//! Sale lifecycle tests
//!
//! Exercises the lifecycle rules end to end against an in-memory store
//! that applies exactly the domain transitions from `shared`:
//! - stock and the movement ledger stay reconciled after every operation
//! - oversell is rejected without partial application
//! - delivered sales are immutable
//! - deletion restores stock only for sales that hold it

use std::collections::HashMap;

use proptest::prelude::*;
use shared::models::{MovementType, SaleStatus, StockEffect};

// ============================================================================
// In-memory model of the store
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct TestStore {
    stock: Vec<i32>,
    ledger: Vec<(usize, MovementType, i32)>,
    sales: HashMap<u32, TestSale>,
    next_sale_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
struct TestSale {
    status: SaleStatus,
    items: Vec<(usize, i32)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpError {
    Validation,
    NotFound,
    InsufficientStock,
    InvalidTransition,
}

impl TestStore {
    /// Seed parts with opening stock; the opening quantities are recorded
    /// as IN entries so the ledger covers the full history.
    fn with_stock(initial: &[i32]) -> Self {
        let mut store = TestStore {
            stock: initial.to_vec(),
            ledger: Vec::new(),
            sales: HashMap::new(),
            next_sale_id: 1,
        };
        for (part, &quantity) in initial.iter().enumerate() {
            if quantity > 0 {
                store.ledger.push((part, MovementType::In, quantity));
            }
        }
        store
    }

    fn balance(&self, part: usize) -> i64 {
        self.ledger
            .iter()
            .filter(|(p, _, _)| *p == part)
            .map(|(_, movement_type, quantity)| movement_type.signed(*quantity))
            .sum()
    }

    fn movements_for(&self, part: usize) -> Vec<(MovementType, i32)> {
        self.ledger
            .iter()
            .filter(|(p, _, _)| *p == part)
            .map(|(_, t, q)| (*t, *q))
            .collect()
    }

    fn create_sale(
        &mut self,
        items: &[(usize, i32)],
        status: SaleStatus,
    ) -> Result<u32, OpError> {
        if status == SaleStatus::Cancelled || items.is_empty() {
            return Err(OpError::Validation);
        }
        for &(part, quantity) in items {
            if quantity <= 0 {
                return Err(OpError::Validation);
            }
            if part >= self.stock.len() {
                return Err(OpError::NotFound);
            }
            if self.stock[part] < quantity {
                return Err(OpError::InsufficientStock);
            }
        }

        if status.holds_stock() {
            for &(part, quantity) in items {
                self.stock[part] -= quantity;
                self.ledger.push((part, MovementType::Out, quantity));
            }
        }

        let id = self.next_sale_id;
        self.next_sale_id += 1;
        self.sales.insert(
            id,
            TestSale {
                status,
                items: items.to_vec(),
            },
        );
        Ok(id)
    }

    fn set_status(&mut self, sale_id: u32, next: SaleStatus) -> Result<(), OpError> {
        let sale = self.sales.get(&sale_id).ok_or(OpError::NotFound)?;
        if sale.status == SaleStatus::Delivered || !sale.status.can_transition_to(next) {
            return Err(OpError::InvalidTransition);
        }

        let items = sale.items.clone();
        match sale.status.stock_effect(next) {
            StockEffect::Commit => {
                for &(part, quantity) in &items {
                    if self.stock[part] < quantity {
                        return Err(OpError::InsufficientStock);
                    }
                }
                for &(part, quantity) in &items {
                    self.stock[part] -= quantity;
                    self.ledger.push((part, MovementType::Out, quantity));
                }
            }
            StockEffect::Release => {
                for &(part, quantity) in &items {
                    self.stock[part] += quantity;
                    self.ledger.push((part, MovementType::In, quantity));
                }
            }
            StockEffect::None => {}
        }

        self.sales.get_mut(&sale_id).expect("checked above").status = next;
        Ok(())
    }

    fn delete_sale(&mut self, sale_id: u32) -> Result<bool, OpError> {
        let sale = self.sales.get(&sale_id).ok_or(OpError::NotFound)?;
        if sale.status == SaleStatus::Delivered {
            return Err(OpError::InvalidTransition);
        }

        let restored = sale.status.holds_stock();
        if restored {
            let items = sale.items.clone();
            for &(part, quantity) in &items {
                self.stock[part] += quantity;
                self.ledger.push((part, MovementType::In, quantity));
            }
        }
        self.sales.remove(&sale_id);
        Ok(restored)
    }

    fn assert_reconciled(&self) {
        for part in 0..self.stock.len() {
            assert_eq!(
                i64::from(self.stock[part]),
                self.balance(part),
                "part {} stock diverged from its ledger",
                part
            );
            assert!(self.stock[part] >= 0, "part {} went negative", part);
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_create_confirmed_decrements_and_writes_ledger() {
        let mut store = TestStore::with_stock(&[10, 5]);
        store
            .create_sale(&[(0, 2), (1, 1)], SaleStatus::Confirmed)
            .unwrap();

        assert_eq!(store.stock, vec![8, 4]);
        assert_eq!(
            store.movements_for(0),
            vec![(MovementType::In, 10), (MovementType::Out, 2)]
        );
        assert_eq!(
            store.movements_for(1),
            vec![(MovementType::In, 5), (MovementType::Out, 1)]
        );
        store.assert_reconciled();
    }

    #[test]
    fn test_create_pending_validates_but_holds_nothing() {
        let mut store = TestStore::with_stock(&[10]);
        store.create_sale(&[(0, 4)], SaleStatus::Pending).unwrap();

        assert_eq!(store.stock, vec![10]);
        assert_eq!(store.movements_for(0), vec![(MovementType::In, 10)]);

        // availability is still checked for pending sales
        let err = store.create_sale(&[(0, 11)], SaleStatus::Pending);
        assert_eq!(err, Err(OpError::InsufficientStock));
    }

    #[test]
    fn test_oversell_leaves_everything_unchanged() {
        let mut store = TestStore::with_stock(&[3, 3]);
        let snapshot = store.clone();

        let err = store.create_sale(&[(0, 2), (1, 5)], SaleStatus::Confirmed);
        assert_eq!(err, Err(OpError::InsufficientStock));
        assert_eq!(store, snapshot);
    }

    #[test]
    fn test_empty_sale_rejected() {
        let mut store = TestStore::with_stock(&[3]);
        assert_eq!(
            store.create_sale(&[], SaleStatus::Confirmed),
            Err(OpError::Validation)
        );
    }

    #[test]
    fn test_confirm_and_unconfirm_round_trip_with_ledger() {
        let mut store = TestStore::with_stock(&[10]);
        let sale = store.create_sale(&[(0, 3)], SaleStatus::Pending).unwrap();

        store.set_status(sale, SaleStatus::Confirmed).unwrap();
        assert_eq!(store.stock, vec![7]);

        store.set_status(sale, SaleStatus::Pending).unwrap();
        assert_eq!(store.stock, vec![10]);

        // both transitions are ledgered
        assert_eq!(
            store.movements_for(0),
            vec![
                (MovementType::In, 10),
                (MovementType::Out, 3),
                (MovementType::In, 3),
            ]
        );
        store.assert_reconciled();
    }

    #[test]
    fn test_confirm_rejects_when_stock_was_taken_meanwhile() {
        let mut store = TestStore::with_stock(&[5]);
        let first = store.create_sale(&[(0, 4)], SaleStatus::Pending).unwrap();
        store.create_sale(&[(0, 3)], SaleStatus::Confirmed).unwrap();

        // only 2 left, the pending sale wants 4
        assert_eq!(
            store.set_status(first, SaleStatus::Confirmed),
            Err(OpError::InsufficientStock)
        );
        store.assert_reconciled();
    }

    #[test]
    fn test_cancel_confirmed_releases_stock() {
        let mut store = TestStore::with_stock(&[6]);
        let sale = store.create_sale(&[(0, 6)], SaleStatus::Confirmed).unwrap();
        assert_eq!(store.stock, vec![0]);

        store.set_status(sale, SaleStatus::Cancelled).unwrap();
        assert_eq!(store.stock, vec![6]);
        store.assert_reconciled();

        // terminal: cannot resurrect, delete restores nothing further
        assert_eq!(
            store.set_status(sale, SaleStatus::Pending),
            Err(OpError::InvalidTransition)
        );
        assert_eq!(store.delete_sale(sale), Ok(false));
        assert_eq!(store.stock, vec![6]);
    }

    #[test]
    fn test_delete_confirmed_restores_stock() {
        let mut store = TestStore::with_stock(&[10]);
        let sale = store.create_sale(&[(0, 2)], SaleStatus::Confirmed).unwrap();
        assert_eq!(store.stock, vec![8]);

        assert_eq!(store.delete_sale(sale), Ok(true));
        assert_eq!(store.stock, vec![10]);
        assert_eq!(
            store.movements_for(0),
            vec![
                (MovementType::In, 10),
                (MovementType::Out, 2),
                (MovementType::In, 2),
            ]
        );
    }

    #[test]
    fn test_delete_pending_restores_nothing_and_round_trips() {
        let mut store = TestStore::with_stock(&[10, 7]);
        let before = store.stock.clone();

        let sale = store
            .create_sale(&[(0, 2), (1, 6)], SaleStatus::Pending)
            .unwrap();
        assert_eq!(store.delete_sale(sale), Ok(false));

        // stock is exactly the pre-create value
        assert_eq!(store.stock, before);
        store.assert_reconciled();
    }

    #[test]
    fn test_second_delete_is_not_found_and_never_double_restores() {
        let mut store = TestStore::with_stock(&[10]);
        let sale = store.create_sale(&[(0, 2)], SaleStatus::Confirmed).unwrap();

        assert_eq!(store.delete_sale(sale), Ok(true));
        assert_eq!(store.stock, vec![10]);

        assert_eq!(store.delete_sale(sale), Err(OpError::NotFound));
        assert_eq!(store.stock, vec![10]);
    }

    #[test]
    fn test_delivered_sales_are_immutable() {
        let mut store = TestStore::with_stock(&[10]);
        let sale = store.create_sale(&[(0, 2)], SaleStatus::Confirmed).unwrap();
        store.set_status(sale, SaleStatus::Delivered).unwrap();

        let snapshot = store.clone();
        for next in [
            SaleStatus::Pending,
            SaleStatus::Confirmed,
            SaleStatus::Cancelled,
        ] {
            assert_eq!(
                store.set_status(sale, next),
                Err(OpError::InvalidTransition)
            );
        }
        assert_eq!(store.delete_sale(sale), Err(OpError::InvalidTransition));
        assert_eq!(store, snapshot);
    }

    #[test]
    fn test_delivery_keeps_stock_out() {
        let mut store = TestStore::with_stock(&[10]);
        let sale = store.create_sale(&[(0, 4)], SaleStatus::Confirmed).unwrap();
        store.set_status(sale, SaleStatus::Delivered).unwrap();

        // delivery itself moves no stock; the confirm already did
        assert_eq!(store.stock, vec![6]);
        assert_eq!(
            store.movements_for(0),
            vec![(MovementType::In, 10), (MovementType::Out, 4)]
        );
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Create {
        part: usize,
        quantity: i32,
        confirmed: bool,
    },
    SetStatus {
        sale: usize,
        status: SaleStatus,
    },
    Delete {
        sale: usize,
    },
}

fn op_strategy(parts: usize) -> impl Strategy<Value = Op> {
    let status = prop_oneof![
        Just(SaleStatus::Pending),
        Just(SaleStatus::Confirmed),
        Just(SaleStatus::Delivered),
        Just(SaleStatus::Cancelled),
    ];
    prop_oneof![
        (0..parts, 1..8i32, any::<bool>()).prop_map(|(part, quantity, confirmed)| Op::Create {
            part,
            quantity,
            confirmed,
        }),
        (0..32usize, status).prop_map(|(sale, status)| Op::SetStatus { sale, status }),
        (0..32usize).prop_map(|sale| Op::Delete { sale }),
    ]
}

proptest! {
    /// After any sequence of operations (successful or rejected), every
    /// part's stock equals the sum of IN minus OUT in its ledger and
    /// never goes negative.
    #[test]
    fn prop_stock_always_matches_ledger(
        initial in proptest::collection::vec(0..30i32, 1..4),
        ops in proptest::collection::vec(op_strategy(3), 0..60),
    ) {
        let parts = initial.len();
        let mut store = TestStore::with_stock(&initial);
        let mut sale_ids: Vec<u32> = Vec::new();

        for op in ops {
            match op {
                Op::Create { part, quantity, confirmed } => {
                    let status = if confirmed { SaleStatus::Confirmed } else { SaleStatus::Pending };
                    if let Ok(id) = store.create_sale(&[(part % parts, quantity)], status) {
                        sale_ids.push(id);
                    }
                }
                Op::SetStatus { sale, status } => {
                    if !sale_ids.is_empty() {
                        let id = sale_ids[sale % sale_ids.len()];
                        let _ = store.set_status(id, status);
                    }
                }
                Op::Delete { sale } => {
                    if !sale_ids.is_empty() {
                        let id = sale_ids[sale % sale_ids.len()];
                        let _ = store.delete_sale(id);
                    }
                }
            }
            store.assert_reconciled();
        }
    }

    /// Creating and then deleting a PENDING sale is a perfect no-op on
    /// stock, whatever the quantities involved.
    #[test]
    fn prop_pending_round_trip_is_stock_neutral(
        initial in proptest::collection::vec(1..50i32, 1..4),
        quantities in proptest::collection::vec(1..10i32, 1..4),
    ) {
        let mut store = TestStore::with_stock(&initial);
        let before = store.stock.clone();

        let items: Vec<(usize, i32)> = quantities
            .iter()
            .enumerate()
            .map(|(i, &q)| (i % initial.len(), q))
            .collect();

        if let Ok(sale) = store.create_sale(&items, SaleStatus::Pending) {
            store.delete_sale(sale).unwrap();
            prop_assert_eq!(&store.stock, &before);
        }
    }

    /// A confirmed sale that is deleted always returns its exact
    /// quantities, leaving stock where it started.
    #[test]
    fn prop_confirmed_delete_round_trips(
        opening in 1..100i32,
        quantity in 1..100i32,
    ) {
        prop_assume!(quantity <= opening);
        let mut store = TestStore::with_stock(&[opening]);
        let before = store.stock.clone();

        let sale = store.create_sale(&[(0, quantity)], SaleStatus::Confirmed).unwrap();
        prop_assert_eq!(store.stock[0], opening - quantity);

        store.delete_sale(sale).unwrap();
        prop_assert_eq!(&store.stock, &before);
        store.assert_reconciled();
    }
}
