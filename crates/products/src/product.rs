use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_core::{DomainError, DomainResult, Entity};

use crate::price::Price;

/// Product identifier.
///
/// The stable key used for catalog membership, lookup, and removal; product
/// names stay a display/uniqueness concern of the catalog, never an identity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
    /// for determinism.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for ProductId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<ProductId> for Uuid {
    fn from(value: ProductId) -> Self {
        value.0
    }
}

impl FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s)
            .map_err(|e| DomainError::invalid_id(format!("ProductId: {e}")))?;
        Ok(Self(uuid))
    }
}

/// One catalog item: name, unit price, stock on hand, availability flag.
///
/// All stock mutations go through validated operations; the struct never
/// exposes its fields for direct mutation. Invariants:
///
/// - `quantity` is unsigned, so stock can never go negative.
/// - `price` is a validated [`Price`], so it can never be negative.
/// - when stock reaches zero the product deactivates itself; the flag may
///   also be toggled manually regardless of stock level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProduct")]
pub struct Product {
    id: ProductId,
    name: String,
    price: Price,
    quantity: u64,
    active: bool,
    created_at: DateTime<Utc>,
}

/// Wire shape of a product, before invariants are checked.
///
/// Deserialization goes through this struct so a payload cannot smuggle in a
/// state that [`Product::new`] would never produce (same pattern as the
/// non-negative guard on [`Price`]).
#[derive(Debug, Deserialize)]
struct RawProduct {
    id: ProductId,
    name: String,
    price: Price,
    quantity: u64,
    active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<RawProduct> for Product {
    type Error = DomainError;

    fn try_from(raw: RawProduct) -> Result<Self, Self::Error> {
        if raw.name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if raw.quantity == 0 && raw.active {
            return Err(DomainError::invariant(format!(
                "product '{}' cannot be active with zero stock",
                raw.name
            )));
        }

        Ok(Self {
            id: raw.id,
            name: raw.name,
            price: raw.price,
            quantity: raw.quantity,
            active: raw.active,
            created_at: raw.created_at,
        })
    }
}

impl Product {
    /// Create a new product.
    ///
    /// Fails with a validation error when the (trimmed) name is empty.
    /// Construction never produces a half-initialized product: invalid input
    /// is an error, not a sentinel. A product created with zero stock starts
    /// inactive, keeping the zero-stock invariant from birth.
    pub fn new(name: impl Into<String>, price: Price, quantity: u64) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }

        Ok(Self {
            id: ProductId::new(),
            name,
            price,
            quantity,
            active: quantity > 0,
            created_at: Utc::now(),
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Current stock on hand.
    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Set the stock level directly (e.g. a restock or a correction).
    ///
    /// Setting the quantity to zero deactivates the product. Setting it back
    /// above zero does not reactivate; that stays an explicit [`activate`]
    /// call, so a manually pulled product cannot resurface via restock.
    ///
    /// [`activate`]: Product::activate
    pub fn set_quantity(&mut self, quantity: u64) {
        self.quantity = quantity;
        if self.quantity == 0 {
            self.deactivate();
        }
    }

    /// Make the product available for sale.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Pull the product from sale without touching its stock.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Purchase `quantity` units, returning the line total.
    ///
    /// Fails with a validation error when `quantity` is zero or exceeds the
    /// current stock; a failed purchase leaves the product untouched. On
    /// success the stock is decremented by exactly `quantity` and the product
    /// deactivates itself if that emptied the stock.
    pub fn buy(&mut self, quantity: u64) -> DomainResult<Decimal> {
        if quantity == 0 {
            return Err(DomainError::validation(
                "quantity to buy must be greater than zero",
            ));
        }
        if quantity > self.quantity {
            return Err(DomainError::validation(format!(
                "not enough stock available for '{}': available {}, requested {}",
                self.name, self.quantity, quantity
            )));
        }

        let total = self.price.total(quantity);
        self.quantity -= quantity;
        if self.quantity == 0 {
            self.deactivate();
        }
        Ok(total)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for Product {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.active {
            write!(
                f,
                "{}, Price: {}, Quantity: {}",
                self.name, self.price, self.quantity
            )
        } else {
            write!(f, "{} is currently unavailable.", self.name)
        }
    }
}
