//! Saved-for-later product list.

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Upper bound on stored entries; the oldest entry is dropped past this.
pub const MAX_WISHLIST_ITEMS: usize = 100;

/// An ordered, duplicate-free list of products, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist(Vec<ProductId>);

impl Wishlist {
    /// Add the product if absent, remove it if present.
    ///
    /// Returns `true` if the product is on the list afterwards.
    pub fn toggle(&mut self, product_id: ProductId) -> bool {
        if self.remove(&product_id) {
            return false;
        }
        if self.0.len() >= MAX_WISHLIST_ITEMS {
            self.0.remove(0);
        }
        self.0.push(product_id);
        true
    }

    /// Remove a product. Returns `true` if it was present.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.0.len();
        self.0.retain(|id| id != product_id);
        self.0.len() != before
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.0.contains(product_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductId> {
        self.0.iter()
    }
}
