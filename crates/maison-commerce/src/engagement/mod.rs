//! Customer engagement: wishlists, reviews, and the newsletter.

mod newsletter;
mod review;
mod wishlist;

pub use newsletter::{normalize_email, Subscriber};
pub use review::{RatingSummary, Review, ReviewDraft, MAX_REVIEW_BODY, MAX_REVIEW_TITLE};
pub use wishlist::{Wishlist, WishlistItem};
