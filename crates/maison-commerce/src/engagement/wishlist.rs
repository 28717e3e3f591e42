//! Wishlists.

use crate::ids::{ProductId, UserId};
use serde::{Deserialize, Serialize};

/// A saved product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WishlistItem {
    pub product_id: ProductId,
    /// Unix timestamp the product was saved.
    pub added_at: i64,
}

/// A customer's saved products, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wishlist {
    pub user_id: UserId,
    pub items: Vec<WishlistItem>,
}

impl Wishlist {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
        }
    }

    /// Save a product. Returns `false` if it was already saved.
    pub fn add(&mut self, product_id: ProductId, now: i64) -> bool {
        if self.contains(&product_id) {
            return false;
        }
        self.items.insert(
            0,
            WishlistItem {
                product_id,
                added_at: now,
            },
        );
        true
    }

    /// Remove a product. Returns whether it was saved.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| &i.product_id != product_id);
        self.items.len() < before
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|i| &i.product_id == product_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut wishlist = Wishlist::new(UserId::new("u"));
        assert!(wishlist.add(ProductId::new("p1"), 1));
        assert!(!wishlist.add(ProductId::new("p1"), 2));
        assert_eq!(wishlist.len(), 1);
        assert_eq!(wishlist.items[0].added_at, 1);
    }

    #[test]
    fn test_newest_first_and_remove() {
        let mut wishlist = Wishlist::new(UserId::new("u"));
        wishlist.add(ProductId::new("p1"), 1);
        wishlist.add(ProductId::new("p2"), 2);
        assert_eq!(wishlist.items[0].product_id.as_str(), "p2");

        assert!(wishlist.remove(&ProductId::new("p1")));
        assert!(!wishlist.remove(&ProductId::new("p1")));
        assert!(!wishlist.contains(&ProductId::new("p1")));
    }
}
