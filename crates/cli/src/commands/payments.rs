//! Payment inspection for manual reconciliation.
//!
//! A confirmation whose compensating delete failed leaves a payment record on
//! an order that is still unpaid. The API logs both ids at error level; this
//! command lists what is recorded for the order so an operator can decide.
//!
//! # Usage
//!
//! ```bash
//! bangaliana-cli payments list -o 0e9a2f4c-7d1b-4c3e-8f5a-6b7c8d9e0f1a
//! ```

use thiserror::Error;

use bangaliana_api::db::{
    OrderRepository, OrderStore, PaymentRepository, PaymentStore, RepositoryError, create_pool,
};
use bangaliana_api::models::{Order, Payment};
use bangaliana_core::OrderId;

#[derive(Debug, Error)]
pub enum PaymentsError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid order id: {0}")]
    InvalidOrderId(#[from] uuid::Error),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Log the order's paid state and every payment recorded against it.
///
/// # Errors
///
/// Returns an error if the id is not a UUID or the database is unreachable.
pub async fn list(order_id: &str) -> Result<(), PaymentsError> {
    let order_id: OrderId = order_id.parse()?;

    let database_url =
        super::database_url().ok_or(PaymentsError::MissingEnvVar("BANGALIANA_DATABASE_URL"))?;
    let pool = create_pool(&database_url).await?;

    let order = OrderRepository::new(pool.clone()).get(order_id).await?;
    let payments = PaymentRepository::new(pool).list_for_order(order_id).await?;

    tracing::info!("{}", order_line(order_id, order.as_ref()));
    for payment in &payments {
        tracing::info!("  {}", payment_line(payment));
    }
    if let Some(warning) = mismatch(order.as_ref(), &payments) {
        tracing::warn!("{warning}");
    }

    Ok(())
}

fn order_line(id: OrderId, order: Option<&Order>) -> String {
    match order {
        None => format!("order {id}: not found"),
        Some(order) => match &order.transaction_id {
            Some(tx) if order.paid => format!("order {id}: paid ({tx})"),
            _ => format!("order {id}: unpaid"),
        },
    }
}

fn payment_line(payment: &Payment) -> String {
    format!(
        "payment {} tx={} at {}",
        payment.id,
        payment.transaction_id,
        payment.created_at.to_rfc3339()
    )
}

/// Payments that do not match the order's recorded transaction.
fn mismatch(order: Option<&Order>, payments: &[Payment]) -> Option<String> {
    let recorded = order.and_then(|o| o.transaction_id.as_deref());
    let orphans = payments
        .iter()
        .filter(|p| Some(p.transaction_id.as_str()) != recorded)
        .count();

    (orphans > 0).then(|| format!("{orphans} payment(s) not matching the order's transaction"))
}
