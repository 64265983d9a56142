//! Client-side cart state.
//!
//! [`CartManager`] owns the authoritative in-memory cart and mirrors it into
//! a [`CartStore`] after every mutation. The in-memory cart is the source of
//! truth for the running session; the stored snapshot only seeds the next
//! one, so a failed save is logged and otherwise ignored.
//!
//! # Invariants
//!
//! - At most one line per (product id, size, color); adding a matching item
//!   increases its quantity
//! - Every quantity is at least one; removal is explicit
//! - `total()` is recomputed from the lines on every call

mod selection;
pub mod store;

pub use selection::{LineSelection, SelectionError};
pub use store::{CartStore, CartStoreError, FileCartStore, MemoryCartStore};

use rakhshan_core::{CartLineItem, Quantity};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::error::add_breadcrumb;

/// Result of [`CartManager::update_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityUpdate {
    /// The quantity changed to the contained value.
    Updated(Quantity),
    /// The change would have dropped the quantity below one (or overflowed),
    /// so it was discarded. Holds the unchanged quantity.
    Floored(Quantity),
    /// No line at that index.
    OutOfRange,
}

/// The shopping cart and its persisted mirror.
pub struct CartManager {
    lines: Vec<CartLineItem>,
    store: Box<dyn CartStore>,
    persisted: bool,
}

impl std::fmt::Debug for CartManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("lines", &self.lines.len())
            .field("persisted", &self.persisted)
            .finish_non_exhaustive()
    }
}

impl CartManager {
    /// Create a cart hydrated from `store`.
    ///
    /// An unreadable snapshot is logged and the cart starts empty.
    pub fn hydrate(store: impl CartStore + 'static) -> Self {
        let (lines, persisted) = match store.load() {
            Ok(lines) => (lines, true),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load saved cart, starting empty");
                (Vec::new(), false)
            }
        };
        let mut cart = Self {
            lines,
            store: Box::new(store),
            persisted,
        };
        cart.enforce_unique_keys();
        tracing::debug!(lines = cart.lines.len(), "Cart hydrated");
        cart
    }

    /// Current lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Sum of price times quantity over all lines, saturating at
    /// [`Decimal::MAX`].
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(CartLineItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Whether the last save reached the store.
    #[must_use]
    pub const fn persistence_healthy(&self) -> bool {
        self.persisted
    }

    /// Add an item, merging with an existing line of the same identity.
    ///
    /// Selections are normalized first, so `Some("N/A")` and `None` name
    /// the same line. A matching line keeps its position and gains the new
    /// quantity; otherwise the item is appended. Returns the index of the
    /// affected line.
    #[instrument(skip(self, item), fields(product_id = %item.product.id, qty = item.quantity.get()))]
    pub fn add(&mut self, item: CartLineItem) -> usize {
        let item = item.normalized();
        let index = match self.position_of(&item) {
            Some(index) => {
                if let Some(line) = self.lines.get_mut(index) {
                    line.quantity = merged_quantity(line.quantity, item.quantity);
                }
                index
            }
            None => {
                self.lines.push(item);
                self.lines.len() - 1
            }
        };

        add_breadcrumb("cart", "Added item to cart", None);
        self.persist();
        index
    }

    /// Remove the line at `index`.
    ///
    /// Out-of-range indices leave the cart untouched and return `None`.
    #[instrument(skip(self))]
    pub fn remove(&mut self, index: usize) -> Option<CartLineItem> {
        if index >= self.lines.len() {
            tracing::debug!(len = self.lines.len(), "Ignoring removal of missing cart line");
            return None;
        }
        let removed = self.lines.remove(index);
        add_breadcrumb("cart", "Removed item from cart", None);
        self.persist();
        Some(removed)
    }

    /// Adjust the quantity at `index` by `delta`.
    ///
    /// Changes that would leave the quantity below one are discarded; use
    /// [`remove`](Self::remove) to drop a line.
    #[instrument(skip(self))]
    pub fn update_quantity(&mut self, index: usize, delta: i64) -> QuantityUpdate {
        let Some(line) = self.lines.get_mut(index) else {
            return QuantityUpdate::OutOfRange;
        };

        match line.quantity.apply_delta(delta) {
            Some(next) if next != line.quantity => {
                line.quantity = next;
                self.persist();
                QuantityUpdate::Updated(next)
            }
            Some(same) => QuantityUpdate::Updated(same),
            None => QuantityUpdate::Floored(line.quantity),
        }
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        self.lines.clear();
        add_breadcrumb("cart", "Cleared cart", None);
        self.persist();
    }

    fn position_of(&self, item: &CartLineItem) -> Option<usize> {
        let key = item.key();
        self.lines.iter().position(|line| line.key() == key)
    }

    /// Fold duplicate identities in a hydrated snapshot into their first
    /// occurrence.
    fn enforce_unique_keys(&mut self) {
        let mut unique: Vec<CartLineItem> = Vec::with_capacity(self.lines.len());
        for line in std::mem::take(&mut self.lines) {
            let line = line.normalized();
            let key = line.key();
            if let Some(existing) = unique.iter_mut().find(|u| u.key() == key) {
                existing.quantity = merged_quantity(existing.quantity, line.quantity);
            } else {
                unique.push(line);
            }
        }
        self.lines = unique;
    }

    fn persist(&mut self) {
        match self.store.save(&self.lines) {
            Ok(()) => self.persisted = true,
            Err(e) => {
                self.persisted = false;
                let reason = e.to_string();
                add_breadcrumb("cart", "Cart save failed", Some(&[("error", reason.as_str())]));
                tracing::warn!(
                    error = %e,
                    lines = self.lines.len(),
                    "Failed to save cart; changes will be lost on restart"
                );
            }
        }
    }
}

fn merged_quantity(current: Quantity, added: Quantity) -> Quantity {
    current.checked_add(added).unwrap_or(current)
}
