//! Checkout planning: everything that can be decided before the first write.

use domain_products::ProductSnapshot;
use std::collections::{BTreeMap, HashMap};

use crate::error::{TransactionError, TransactionResult};
use crate::models::CheckoutItem;

/// One future `transaction_details` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub subtotal: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    pub total_amount: i64,
    /// In request order
    pub lines: Vec<CheckoutLine>,
    /// Total quantity per product, ascending by product id
    pub demand: BTreeMap<i32, i32>,
}

impl CheckoutPlan {
    /// Units sold across all lines.
    pub fn units(&self) -> u64 {
        self.lines.iter().map(|l| l.quantity.max(0) as u64).sum()
    }
}

/// Distinct product ids referenced by `items`, for the batched lookup.
pub fn requested_ids(items: &[CheckoutItem]) -> Vec<i32> {
    let mut ids: Vec<i32> = items.iter().map(|i| i.product_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Prices `items` against `catalog`.
///
/// Fails on the first item whose product is absent, so nothing is written
/// for a request that references an unknown product. A product listed more
/// than once accumulates its quantities in `demand`.
pub fn plan(
    items: &[CheckoutItem],
    catalog: &HashMap<i32, ProductSnapshot>,
) -> TransactionResult<CheckoutPlan> {
    if items.is_empty() {
        return Err(TransactionError::Validation(
            "items must contain at least one entry".to_string(),
        ));
    }

    let mut total_amount: i64 = 0;
    let mut lines = Vec::with_capacity(items.len());
    let mut demand: BTreeMap<i32, i32> = BTreeMap::new();

    for item in items {
        if item.quantity <= 0 {
            return Err(TransactionError::Validation(format!(
                "quantity for product {} must be positive",
                item.product_id
            )));
        }

        let product = catalog
            .get(&item.product_id)
            .ok_or(TransactionError::UnknownProduct(item.product_id))?;

        let subtotal = product
            .price
            .checked_mul(i64::from(item.quantity))
            .ok_or_else(|| overflow(item.product_id))?;
        total_amount = total_amount
            .checked_add(subtotal)
            .ok_or_else(|| overflow(item.product_id))?;

        let requested = demand.entry(item.product_id).or_insert(0);
        *requested = requested
            .checked_add(item.quantity)
            .ok_or_else(|| overflow(item.product_id))?;

        lines.push(CheckoutLine {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity: item.quantity,
            subtotal,
        });
    }

    Ok(CheckoutPlan {
        total_amount,
        lines,
        demand,
    })
}

fn overflow(product_id: i32) -> TransactionError {
    TransactionError::Validation(format!("amount overflow at product {}", product_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> HashMap<i32, ProductSnapshot> {
        [(1, "A", 1000, 5), (2, "B", 500, 10)]
            .into_iter()
            .map(|(id, name, price, stock)| {
                (
                    id,
                    ProductSnapshot {
                        id,
                        name: name.to_string(),
                        price,
                        stock,
                    },
                )
            })
            .collect()
    }

    fn item(product_id: i32, quantity: i32) -> CheckoutItem {
        CheckoutItem {
            product_id,
            quantity,
        }
    }

    #[test]
    fn test_totals_and_subtotals() {
        let plan = plan(&[item(1, 2), item(2, 3)], &catalog()).unwrap();

        assert_eq!(plan.total_amount, 3500);
        assert_eq!(
            plan.lines.iter().map(|l| l.subtotal).collect::<Vec<_>>(),
            vec![2000, 1500]
        );
        assert_eq!(plan.lines[0].product_name, "A");
        assert_eq!(plan.units(), 5);
    }

    #[test]
    fn test_repeated_product_accumulates_demand() {
        let plan = plan(&[item(2, 1), item(1, 1), item(2, 4)], &catalog()).unwrap();

        assert_eq!(plan.demand, BTreeMap::from([(1, 1), (2, 5)]));
        assert_eq!(plan.lines.len(), 3);
        assert_eq!(plan.total_amount, 3500);
    }

    #[test]
    fn test_unknown_product_fails_whole_plan() {
        let result = plan(&[item(1, 2), item(3, 1)], &catalog());
        assert!(matches!(result, Err(TransactionError::UnknownProduct(3))));
    }

    #[test]
    fn test_empty_and_non_positive_items_are_rejected() {
        assert!(matches!(plan(&[], &catalog()), Err(TransactionError::Validation(_))));
        assert!(matches!(
            plan(&[item(1, 0)], &catalog()),
            Err(TransactionError::Validation(_))
        ));
        assert!(matches!(
            plan(&[item(1, -2)], &catalog()),
            Err(TransactionError::Validation(_))
        ));
    }

    #[test]
    fn test_overflow_is_a_validation_error() {
        let mut catalog = catalog();
        catalog.insert(
            9,
            ProductSnapshot {
                id: 9,
                name: "Gold".into(),
                price: i64::MAX / 2,
                stock: 10,
            },
        );

        let result = plan(&[item(9, 3)], &catalog);
        assert!(matches!(result, Err(TransactionError::Validation(ref m)) if m.contains("overflow")));
    }

    #[test]
    fn test_requested_ids_are_distinct_and_sorted() {
        assert_eq!(requested_ids(&[item(5, 1), item(2, 1), item(5, 3)]), vec![2, 5]);
    }
}
