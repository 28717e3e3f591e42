//! Product reviews and rating summaries.

use crate::error::CommerceError;
use crate::ids::{ProductId, ReviewId, UserId};
use serde::{Deserialize, Serialize};

/// Maximum review title length in characters.
pub const MAX_REVIEW_TITLE: usize = 120;
/// Maximum review body length in characters.
pub const MAX_REVIEW_BODY: usize = 2000;

/// Review fields submitted by a customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewDraft {
    pub rating: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl ReviewDraft {
    /// Check rating range and text lengths, trimming blank text to `None`.
    pub fn validate(self) -> Result<Self, CommerceError> {
        if !(1..=5).contains(&self.rating) {
            return Err(CommerceError::validation("rating must be between 1 and 5"));
        }
        let title = clean(self.title);
        let body = clean(self.body);
        if title.as_ref().is_some_and(|t| t.chars().count() > MAX_REVIEW_TITLE) {
            return Err(CommerceError::validation(format!(
                "title must be at most {MAX_REVIEW_TITLE} characters"
            )));
        }
        if body.as_ref().is_some_and(|b| b.chars().count() > MAX_REVIEW_BODY) {
            return Err(CommerceError::validation(format!(
                "review must be at most {MAX_REVIEW_BODY} characters"
            )));
        }
        Ok(Self {
            rating: self.rating,
            title,
            body,
        })
    }
}

fn clean(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// A published review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// Reviewer display name.
    pub author: Option<String>,
    pub rating: i64,
    pub title: Option<String>,
    pub body: Option<String>,
    /// The reviewer received a delivered order containing the product.
    pub verified_purchase: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Review {
    /// Create a review from a validated draft.
    pub fn new(
        product_id: ProductId,
        user_id: UserId,
        draft: ReviewDraft,
        verified_purchase: bool,
    ) -> Result<Self, CommerceError> {
        let draft = draft.validate()?;
        let now = crate::current_timestamp();
        Ok(Self {
            id: ReviewId::generate(),
            product_id,
            user_id,
            author: None,
            rating: draft.rating,
            title: draft.title,
            body: draft.body,
            verified_purchase,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Aggregate ratings for a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RatingSummary {
    /// Mean rating rounded to one decimal, 0 when there are no reviews.
    pub average: f64,
    pub count: i64,
    /// Number of 1..=5 star reviews, index 0 is one star.
    pub histogram: [i64; 5],
}

impl RatingSummary {
    /// Summarize ratings; values outside 1..=5 are ignored.
    pub fn from_ratings(ratings: impl IntoIterator<Item = i64>) -> Self {
        let mut histogram = [0i64; 5];
        let mut total = 0i64;
        let mut count = 0i64;
        for rating in ratings {
            if (1..=5).contains(&rating) {
                histogram[(rating - 1) as usize] += 1;
                total += rating;
                count += 1;
            }
        }
        let average = if count == 0 {
            0.0
        } else {
            ((total as f64 / count as f64) * 10.0).round() / 10.0
        };
        Self {
            average,
            count,
            histogram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(rating: i64) -> ReviewDraft {
        ReviewDraft {
            rating,
            title: Some("  Lovely fit ".into()),
            body: Some("   ".into()),
        }
    }

    #[test]
    fn test_draft_validation() {
        let cleaned = draft(5).validate().unwrap();
        assert_eq!(cleaned.title.as_deref(), Some("Lovely fit"));
        assert!(cleaned.body.is_none());

        assert!(draft(0).validate().is_err());
        assert!(draft(6).validate().is_err());
    }

    #[test]
    fn test_length_limits() {
        let mut long = draft(4);
        long.title = Some("x".repeat(MAX_REVIEW_TITLE + 1));
        assert!(long.validate().is_err());

        let mut long = draft(4);
        long.body = Some("y".repeat(MAX_REVIEW_BODY + 1));
        assert!(long.validate().is_err());

        let mut ok = draft(4);
        ok.body = Some("y".repeat(MAX_REVIEW_BODY));
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_rating_summary() {
        let summary = RatingSummary::from_ratings([5, 4, 4, 1, 9]);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.histogram, [1, 0, 0, 2, 1]);
        assert!((summary.average - 3.5).abs() < f64::EPSILON);

        let empty = RatingSummary::from_ratings(Vec::new());
        assert_eq!(empty.count, 0);
        assert_eq!(empty.average, 0.0);
    }

    #[test]
    fn test_review_new() {
        let review = Review::new(ProductId::new("p"), UserId::new("u"), draft(3), true).unwrap();
        assert!(review.verified_purchase);
        assert_eq!(review.rating, 3);
    }
}
