//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::db::Stores;
use crate::services::auth::TokenService;
use crate::services::payments::{PaymentGateway, PaymentReconciler, StripeGateway};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and hands handlers their
/// stores, token service and payment gateway. Nothing is reached through
/// globals.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    stores: Stores,
    tokens: TokenService,
    gateway: Arc<dyn PaymentGateway>,
    reconciler: PaymentReconciler,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create state from explicit parts.
    ///
    /// `pool` is used only for readiness checks; pass `None` for in-memory
    /// stores.
    #[must_use]
    pub fn new(
        stores: Stores,
        tokens: TokenService,
        gateway: Arc<dyn PaymentGateway>,
        pool: Option<PgPool>,
    ) -> Self {
        let reconciler = PaymentReconciler::new(&stores);
        Self {
            inner: Arc::new(AppStateInner {
                stores,
                tokens,
                gateway,
                reconciler,
                pool,
            }),
        }
    }

    /// Production state: `PostgreSQL` stores and the Stripe gateway.
    #[must_use]
    pub fn from_config(config: &ApiConfig, pool: PgPool) -> Self {
        Self::new(
            Stores::postgres(&pool),
            TokenService::new(&config.access_token_secret),
            Arc::new(StripeGateway::new(&config.stripe)),
            Some(pool),
        )
    }

    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.inner.stores
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    #[must_use]
    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.inner.gateway.as_ref()
    }

    #[must_use]
    pub fn reconciler(&self) -> &PaymentReconciler {
        &self.inner.reconciler
    }

    /// Database pool, if the stores are `PostgreSQL`-backed.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
