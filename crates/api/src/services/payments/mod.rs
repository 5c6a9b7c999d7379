//! Payment intents and payment reconciliation.
//!
//! Confirming a payment touches two records without a shared transaction:
//!
//! ```text
//! order exists? --no--> OrderNotFound
//!      | yes
//! already paid? --same tx--> Ok (nothing written)
//!      |        --other tx--> AlreadyPaid
//!      | no
//! insert payment --> mark order paid (only if still unpaid)
//!                         | lost the race / failed
//!                         +--> delete the payment just inserted
//! ```
//!
//! The order's `paid` flag is written last and never cleared, so a failure at
//! any step leaves the order unpaid or paid exactly once. The window that
//! remains is a failed compensation: the orphaned payment is logged with both
//! ids at error level.

pub mod stripe;

pub use stripe::{GatewayError, PaymentGateway, StripeGateway};

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use bangaliana_core::{CurrencyCode, OrderId, PaymentId, Price, PriceError};

use crate::db::{OrderStore, PaymentStore, RepositoryError, Stores};
use crate::models::{NewPayment, Order, PaymentConfirmation};

/// Errors from creating intents or reconciling payments.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// The order was already paid under another transaction.
    #[error("order {0} is already paid")]
    AlreadyPaid(OrderId),

    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] PriceError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Response body of a successful confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedPayment {
    pub paid: bool,
    pub transaction_id: String,
}

impl ConfirmedPayment {
    fn new(transaction_id: String) -> Self {
        Self {
            paid: true,
            transaction_id,
        }
    }
}

/// Request a payment intent for `price` and return its client secret.
///
/// The gateway is charged `price * 100` minor units in USD. Nothing is
/// persisted and no order changes state.
///
/// # Errors
///
/// Returns `PaymentError::InvalidAmount` if the price does not convert to a
/// positive whole number of cents, or `PaymentError::Gateway` if the gateway
/// fails.
#[instrument(skip(gateway))]
pub async fn create_intent(gateway: &dyn PaymentGateway, price: Price) -> Result<String, PaymentError> {
    let amount = price.to_minor_units()?;
    let secret = gateway.create_intent(amount, CurrencyCode::USD).await?;
    Ok(secret)
}

/// Records confirmed payments and marks their orders paid.
#[derive(Clone)]
pub struct PaymentReconciler {
    orders: Arc<dyn OrderStore>,
    payments: Arc<dyn PaymentStore>,
}

impl PaymentReconciler {
    #[must_use]
    pub fn new(stores: &Stores) -> Self {
        Self {
            orders: stores.orders.clone(),
            payments: stores.payments.clone(),
        }
    }

    /// Confirm a payment against `order_id`.
    ///
    /// # Errors
    ///
    /// - `PaymentError::OrderNotFound` if the order does not exist
    /// - `PaymentError::AlreadyPaid` if the order was paid under another
    ///   transaction
    /// - `PaymentError::Repository` if a store operation fails
    #[instrument(skip(self, confirmation), fields(transaction_id = %confirmation.transaction_id))]
    pub async fn confirm(
        &self,
        order_id: OrderId,
        confirmation: PaymentConfirmation,
    ) -> Result<ConfirmedPayment, PaymentError> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or(PaymentError::OrderNotFound(order_id))?;

        if order.paid {
            return settled(order, &confirmation.transaction_id);
        }

        let transaction_id = confirmation.transaction_id.clone();
        let payment = self
            .payments
            .insert(NewPayment::from_confirmation(order_id, confirmation))
            .await?;

        match self.orders.mark_paid(order_id, &transaction_id).await {
            Ok(true) => {
                info!(order_id = %order_id, payment_id = %payment.id, "Order marked paid");
                Ok(ConfirmedPayment::new(transaction_id))
            }
            Ok(false) => {
                // Deleted or paid by a concurrent confirmation since the read.
                self.compensate(order_id, payment.id).await;
                match self.orders.get(order_id).await? {
                    Some(order) => settled(order, &transaction_id),
                    None => Err(PaymentError::OrderNotFound(order_id)),
                }
            }
            Err(e) => {
                self.compensate(order_id, payment.id).await;
                Err(e.into())
            }
        }
    }

    async fn compensate(&self, order_id: OrderId, payment_id: PaymentId) {
        match self.payments.delete(payment_id).await {
            Ok(_) => {
                warn!(order_id = %order_id, payment_id = %payment_id, "Removed payment for unconfirmed order");
            }
            Err(e) => {
                error!(
                    order_id = %order_id,
                    payment_id = %payment_id,
                    error = %e,
                    "Orphaned payment record needs manual reconciliation"
                );
            }
        }
    }
}

/// Outcome of confirming an order that is already paid.
fn settled(order: Order, transaction_id: &str) -> Result<ConfirmedPayment, PaymentError> {
    match order.transaction_id {
        Some(recorded) if recorded == transaction_id => Ok(ConfirmedPayment::new(recorded)),
        _ => {
            warn!(order_id = %order.id, "Rejected confirmation for an order paid under another transaction");
            Err(PaymentError::AlreadyPaid(order.id))
        }
    }
}
