//! Category types for product organization.

use crate::catalog::validate_slug;
use crate::error::CommerceError;
use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};

/// A product category in the catalog hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Parent category ID (None for root categories).
    pub parent_id: Option<CategoryId>,
    /// Category name.
    pub name: String,
    /// URL-friendly slug.
    pub slug: String,
    /// Category description.
    pub description: Option<String>,
    /// Category image URL.
    pub image_url: Option<String>,
    /// Sort order position within parent.
    pub position: i64,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Category {
    /// Create a new root category.
    pub fn new_root(name: impl Into<String>, slug: impl Into<String>) -> Self {
        let now = crate::current_timestamp();
        Self {
            id: CategoryId::generate(),
            parent_id: None,
            name: name.into(),
            slug: slug.into(),
            description: None,
            image_url: None,
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new child category.
    pub fn new_child(parent: &Category, name: impl Into<String>, slug: impl Into<String>) -> Self {
        let mut category = Self::new_root(name, slug);
        category.parent_id = Some(parent.id.clone());
        category
    }

    /// Check if this is a root category.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check name and slug.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let name = self.name.trim();
        if name.is_empty() || name.chars().count() > 100 {
            return Err(CommerceError::validation(
                "category name must be 1-100 characters",
            ));
        }
        validate_slug(&self.slug)?;
        if self.parent_id.as_ref() == Some(&self.id) {
            return Err(CommerceError::validation(
                "category cannot be its own parent",
            ));
        }
        Ok(())
    }

    /// Collect this category's ID and the IDs of every category below it.
    ///
    /// `all` is the full category list; cycles are ignored.
    pub fn descendant_ids(&self, all: &[Category]) -> Vec<CategoryId> {
        let mut ids = vec![self.id.clone()];
        let mut cursor = 0;
        while cursor < ids.len() {
            let current = ids[cursor].clone();
            for child in all
                .iter()
                .filter(|c| c.parent_id.as_ref() == Some(&current))
            {
                if !ids.contains(&child.id) {
                    ids.push(child.id.clone());
                }
            }
            cursor += 1;
        }
        ids
    }

    /// Check whether making `new_parent` the parent would create a cycle.
    pub fn would_cycle(&self, new_parent: &CategoryId, all: &[Category]) -> bool {
        self.descendant_ids(all).contains(new_parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_category() {
        let cat = Category::new_root("Women", "women");
        assert!(cat.is_root());
        assert!(cat.validate().is_ok());
    }

    #[test]
    fn test_child_category() {
        let parent = Category::new_root("Women", "women");
        let child = Category::new_child(&parent, "Dresses", "dresses");
        assert!(!child.is_root());
        assert_eq!(child.parent_id, Some(parent.id));
    }

    #[test]
    fn test_descendants() {
        let root = Category::new_root("Women", "women");
        let dresses = Category::new_child(&root, "Dresses", "dresses");
        let maxi = Category::new_child(&dresses, "Maxi", "maxi");
        let men = Category::new_root("Men", "men");
        let all = vec![root.clone(), dresses.clone(), maxi.clone(), men.clone()];

        let ids = root.descendant_ids(&all);
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&maxi.id));
        assert!(!ids.contains(&men.id));

        assert!(root.would_cycle(&maxi.id, &all));
        assert!(!maxi.would_cycle(&men.id, &all));
    }

    #[test]
    fn test_invalid_category() {
        let mut cat = Category::new_root("", "women");
        assert!(cat.validate().is_err());
        cat.name = "Women".into();
        cat.slug = "Women Wear".into();
        assert!(cat.validate().is_err());
    }
}
