//! Shared application state.

use std::sync::Arc;

use maison_commerce::cart::ShippingPolicy;
use maison_commerce::Currency;
use maison_db::Db;

use crate::config::AppConfig;
use crate::gateway::PaymentGateway;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Arc<AppConfig>,
    pub gateway: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub fn new(db: Db, config: AppConfig, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            gateway,
        }
    }

    pub fn currency(&self) -> Currency {
        self.config.store.currency
    }

    pub fn shipping_policy(&self) -> ShippingPolicy {
        self.config.store.shipping_policy()
    }
}
