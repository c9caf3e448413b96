use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use storefront_core::{DomainError, DomainResult};
use storefront_products::{Product, ProductId};

use crate::order::OrderLine;

/// What to do when a product is added under a name already in the catalog.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateNamePolicy {
    /// Reject the addition with a conflict error (default).
    #[default]
    Reject,
    /// Append unconditionally; lookups by name return the first match.
    Allow,
}

/// Aggregate root: the product catalog plus order processing against it.
///
/// Owns an ordered collection of [`Product`]s keyed by [`ProductId`]. The
/// backing collection is never handed out; catalog queries return defensive
/// snapshots, and stock mutation happens only through [`Store::order`] or a
/// product's own validated operations via [`Store::get_product_mut`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    products: Vec<Product>,
    duplicate_names: DuplicateNamePolicy,
}

impl Store {
    /// Create an empty store.
    pub fn new(duplicate_names: DuplicateNamePolicy) -> Self {
        Self {
            products: Vec::new(),
            duplicate_names,
        }
    }

    /// Create a store seeded with an initial product collection (empty allowed).
    ///
    /// Under [`DuplicateNamePolicy::Reject`], duplicate names within the seed
    /// fail with a conflict error.
    pub fn with_products(
        products: impl IntoIterator<Item = Product>,
        duplicate_names: DuplicateNamePolicy,
    ) -> DomainResult<Self> {
        let mut store = Self::new(duplicate_names);
        for product in products {
            store.add_product(product)?;
        }
        Ok(store)
    }

    /// Append a product to the catalog.
    ///
    /// Fails with a conflict error on a duplicate name when the store was
    /// configured with [`DuplicateNamePolicy::Reject`].
    pub fn add_product(&mut self, product: Product) -> DomainResult<()> {
        if self.duplicate_names == DuplicateNamePolicy::Reject
            && self.products.iter().any(|p| p.name() == product.name())
        {
            return Err(DomainError::conflict(format!(
                "product '{}' already exists in the store",
                product.name()
            )));
        }
        self.products.push(product);
        Ok(())
    }

    /// Remove a product from the catalog, returning it.
    ///
    /// Fails with a not-found error when no product has this id.
    pub fn remove_product(&mut self, id: &ProductId) -> DomainResult<Product> {
        let position = self
            .products
            .iter()
            .position(|p| p.id_typed() == *id)
            .ok_or_else(|| DomainError::not_found(format!("product '{id}' is not in the store")))?;
        Ok(self.products.remove(position))
    }

    /// Look up a product by id.
    pub fn get_product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id_typed() == *id)
    }

    /// Mutable access to a product, for stock corrections and manual
    /// activation/deactivation. All mutation still goes through the
    /// product's validated operations; the collection itself stays hidden.
    pub fn get_product_mut(&mut self, id: &ProductId) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id_typed() == *id)
    }

    /// Look up a product by name (first match in collection order).
    pub fn find_by_name(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.name() == name)
    }

    /// Total stock across all *active* products.
    ///
    /// Inactive products contribute zero even when their stored quantity is
    /// nonzero (e.g. manually pulled from sale).
    pub fn get_total_quantity(&self) -> u64 {
        self.products
            .iter()
            .filter(|p| p.is_active())
            .map(Product::quantity)
            .sum()
    }

    /// Snapshot of all active products, in collection order.
    ///
    /// Returns clones; the snapshot does not reflect later catalog mutations.
    pub fn get_all_products(&self) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| p.is_active())
            .cloned()
            .collect()
    }

    /// Process a shopping list and return the order total.
    ///
    /// All-or-nothing: every line is validated against current stock before
    /// any stock is touched, so a failing line anywhere in the list leaves the
    /// whole catalog unchanged. Demand is summed per product across lines, so
    /// a product listed twice cannot oversell. An empty list is a valid order
    /// with total zero.
    pub fn order(&mut self, shopping_list: &[OrderLine]) -> DomainResult<Decimal> {
        self.validate_order(shopping_list)?;

        let mut total = Decimal::ZERO;
        for line in shopping_list {
            let product = self
                .get_product_mut(&line.product_id)
                .ok_or_else(|| {
                    DomainError::not_found(format!(
                        "product '{}' is not in the store",
                        line.product_id
                    ))
                })?;
            let name = product.name().to_owned();

            // Cannot fail after validation; surfacing it anyway beats a panic.
            let line_total = product.buy(line.quantity).map_err(|e| {
                DomainError::invariant(format!("purchase failed for '{name}': {e}"))
            })?;

            debug!(product = %name, quantity = line.quantity, %line_total, "order line purchased");
            total += line_total;
        }

        info!(lines = shopping_list.len(), %total, "order completed");
        Ok(total)
    }

    /// Validate a shopping list against current stock without mutating it.
    fn validate_order(&self, shopping_list: &[OrderLine]) -> DomainResult<()> {
        let mut demand: HashMap<ProductId, u64> = HashMap::new();

        for line in shopping_list {
            let product = self.get_product(&line.product_id).ok_or_else(|| {
                DomainError::not_found(format!(
                    "product '{}' is not in the store",
                    line.product_id
                ))
            })?;

            if !product.is_active() {
                return Err(DomainError::validation(format!(
                    "product '{}' is no longer available",
                    product.name()
                )));
            }

            if line.quantity == 0 {
                return Err(DomainError::validation(format!(
                    "quantity for '{}' must be greater than zero",
                    product.name()
                )));
            }

            let requested = demand.entry(line.product_id).or_default();
            *requested = requested.saturating_add(line.quantity);
            if *requested > product.quantity() {
                return Err(DomainError::validation(format!(
                    "not enough stock available for '{}': available {}, requested {}",
                    product.name(),
                    product.quantity(),
                    *requested
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use storefront_products::Price;

    fn product(name: &str, price: Decimal, quantity: u64) -> Product {
        Product::new(name, Price::new(price).unwrap(), quantity).unwrap()
    }

    fn seeded_store() -> (Store, ProductId, ProductId) {
        let mac = product("MacBook Air M2", dec!(1450), 100);
        let bose = product("Bose QuietComfort Earbuds", dec!(250), 500);
        let mac_id = mac.id_typed();
        let bose_id = bose.id_typed();
        let store =
            Store::with_products([mac, bose], DuplicateNamePolicy::Reject).unwrap();
        (store, mac_id, bose_id)
    }

    #[test]
    fn add_product_rejects_duplicate_name_under_reject_policy() {
        let (mut store, _, _) = seeded_store();
        let err = store
            .add_product(product("MacBook Air M2", dec!(1500), 10))
            .unwrap_err();
        match err {
            DomainError::Conflict(msg) => assert!(msg.contains("MacBook Air M2")),
            _ => panic!("expected Conflict error for duplicate name"),
        }
        assert_eq!(store.get_all_products().len(), 2);
    }

    #[test]
    fn add_product_allows_duplicate_name_under_allow_policy() {
        let mut store = Store::new(DuplicateNamePolicy::Allow);
        store.add_product(product("Widget", dec!(10), 1)).unwrap();
        store.add_product(product("Widget", dec!(12), 2)).unwrap();
        assert_eq!(store.get_all_products().len(), 2);
    }

    #[test]
    fn with_products_rejects_duplicate_seed_names() {
        let err = Store::with_products(
            [product("Widget", dec!(10), 1), product("Widget", dec!(12), 2)],
            DuplicateNamePolicy::Reject,
        )
        .unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            _ => panic!("expected Conflict error for duplicate seed names"),
        }
    }

    #[test]
    fn remove_product_returns_the_entry() {
        let (mut store, mac_id, _) = seeded_store();
        let removed = store.remove_product(&mac_id).unwrap();
        assert_eq!(removed.name(), "MacBook Air M2");
        assert!(store.get_product(&mac_id).is_none());
    }

    #[test]
    fn remove_product_fails_when_absent() {
        let (mut store, mac_id, _) = seeded_store();
        store.remove_product(&mac_id).unwrap();
        let err = store.remove_product(&mac_id).unwrap_err();
        match err {
            DomainError::NotFound(msg) => assert!(msg.contains(&mac_id.to_string())),
            _ => panic!("expected NotFound error"),
        }
    }

    #[test]
    fn total_quantity_counts_only_active_products() {
        let (mut store, mac_id, _) = seeded_store();
        assert_eq!(store.get_total_quantity(), 600);

        store.get_product_mut(&mac_id).unwrap().deactivate();
        assert_eq!(store.get_total_quantity(), 500);
    }

    #[test]
    fn get_all_products_excludes_inactive_and_is_a_snapshot() {
        let (mut store, mac_id, bose_id) = seeded_store();
        store.get_product_mut(&mac_id).unwrap().deactivate();

        let snapshot = store.get_all_products();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name(), "Bose QuietComfort Earbuds");

        // Later mutation must not show through the snapshot.
        store
            .order(&[OrderLine::new(bose_id, 2)])
            .unwrap();
        assert_eq!(snapshot[0].quantity(), 500);
        assert_eq!(store.get_product(&bose_id).unwrap().quantity(), 498);
    }

    #[test]
    fn find_by_name_returns_first_match() {
        let (store, mac_id, _) = seeded_store();
        assert_eq!(
            store.find_by_name("MacBook Air M2").unwrap().id_typed(),
            mac_id
        );
        assert!(store.find_by_name("Nothing").is_none());
    }

    #[test]
    fn order_rejects_unknown_product_id() {
        let (mut store, _, _) = seeded_store();
        let ghost = ProductId::new();
        let err = store.order(&[OrderLine::new(ghost, 1)]).unwrap_err();
        match err {
            DomainError::NotFound(msg) => assert!(msg.contains(&ghost.to_string())),
            _ => panic!("expected NotFound error for unknown product id"),
        }
    }

    #[test]
    fn order_rejects_zero_quantity_line() {
        let (mut store, mac_id, _) = seeded_store();
        let err = store.order(&[OrderLine::new(mac_id, 0)]).unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("greater than zero")),
            _ => panic!("expected Validation error for zero quantity"),
        }
        assert_eq!(store.get_product(&mac_id).unwrap().quantity(), 100);
    }

    #[test]
    fn order_sums_demand_across_duplicate_lines() {
        let (mut store, mac_id, _) = seeded_store();

        // 60 + 60 exceeds the 100 in stock even though each line alone fits.
        let err = store
            .order(&[OrderLine::new(mac_id, 60), OrderLine::new(mac_id, 60)])
            .unwrap_err();
        match err {
            DomainError::Validation(msg) => {
                assert!(msg.contains("available 100"));
                assert!(msg.contains("requested 120"));
            }
            _ => panic!("expected Validation error for oversell across lines"),
        }
        assert_eq!(store.get_product(&mac_id).unwrap().quantity(), 100);

        // 60 + 40 exactly drains the stock.
        let total = store
            .order(&[OrderLine::new(mac_id, 60), OrderLine::new(mac_id, 40)])
            .unwrap();
        assert_eq!(total, dec!(145000));
        let mac = store.get_product(&mac_id).unwrap();
        assert_eq!(mac.quantity(), 0);
        assert!(!mac.is_active());
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_price() -> impl Strategy<Value = Decimal> {
            (0i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: an order either succeeds with the total equal to the
            /// sum of line totals at pre-order prices, or fails leaving the
            /// whole store byte-for-byte unchanged.
            #[test]
            fn order_is_all_or_nothing(
                price_a in arb_price(),
                price_b in arb_price(),
                stock_a in 0u64..500,
                stock_b in 0u64..500,
                lines in proptest::collection::vec((0usize..2, 0u64..700), 0..6),
            ) {
                let a = Product::new("A", Price::new(price_a).unwrap(), stock_a).unwrap();
                let b = Product::new("B", Price::new(price_b).unwrap(), stock_b).unwrap();
                let ids = [a.id_typed(), b.id_typed()];
                let mut store =
                    Store::with_products([a, b], DuplicateNamePolicy::Reject).unwrap();
                let before = store.clone();

                let shopping_list: Vec<OrderLine> = lines
                    .into_iter()
                    .map(|(which, quantity)| OrderLine::new(ids[which], quantity))
                    .collect();

                let expected: Decimal = shopping_list
                    .iter()
                    .map(|line| {
                        before
                            .get_product(&line.product_id)
                            .unwrap()
                            .price()
                            .total(line.quantity)
                    })
                    .sum();

                match store.order(&shopping_list) {
                    Ok(total) => {
                        prop_assert_eq!(total, expected);
                        for id in &ids {
                            let before_qty = before.get_product(id).unwrap().quantity();
                            let sold: u64 = shopping_list
                                .iter()
                                .filter(|l| l.product_id == *id)
                                .map(|l| l.quantity)
                                .sum();
                            prop_assert_eq!(
                                store.get_product(id).unwrap().quantity(),
                                before_qty - sold
                            );
                        }
                    }
                    Err(_) => prop_assert_eq!(&store, &before),
                }
            }
        }
    }
}
