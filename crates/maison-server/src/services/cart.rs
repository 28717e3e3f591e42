//! Pricing stored cart lines against the live catalog.

use maison_commerce::cart::{Cart, LineItem};
use maison_commerce::UserId;
use tracing::debug;

use crate::error::ApiError;
use crate::repo::{cart as cart_repo, catalog};
use crate::state::AppState;

/// Build the user's cart with current prices and stock.
///
/// Lines whose variant has disappeared are dropped from the store.
pub async fn load_cart(state: &AppState, user_id: &UserId) -> Result<Cart, ApiError> {
    let mut cart = Cart::new(user_id.clone(), state.currency());
    for line in cart_repo::list_lines(&state.db, user_id).await? {
        match catalog::find_variant_with_product(&state.db, &line.variant_id).await? {
            Some((product, variant)) => {
                cart.add_item(LineItem::new(&product, &variant, line.quantity)?)?;
            }
            None => {
                debug!(variant_id = %line.variant_id, "dropping stale cart line");
                cart_repo::remove(&state.db, user_id, &line.variant_id).await?;
            }
        }
    }
    Ok(cart)
}
