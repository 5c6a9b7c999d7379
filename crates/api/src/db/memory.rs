//! In-memory implementation of every store trait.
//!
//! Mirrors the `PostgreSQL` repositories' semantics (upserts, guarded
//! `mark_paid`, shallow document merges) so routes can be exercised without a
//! database.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

use bangaliana_core::{DocumentId, Email, OrderId, PaymentId, Role};

use super::{DocumentStore, OrderStore, PaymentStore, RepositoryError, Upserted, UserStore};
use crate::models::{Collection, Document, NewOrder, NewPayment, Order, OrderUpdate, Payment, User};

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<String, User>,
    orders: Vec<Order>,
    payments: Vec<Payment>,
    documents: Vec<(Collection, Document)>,
}

/// Process-local store. Cheap to share behind an `Arc`.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self.state().users.get(email.as_str()).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let mut users: Vec<User> = self.state().users.values().cloned().collect();
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }

    async fn upsert_profile(
        &self,
        email: &Email,
        profile: Map<String, Value>,
    ) -> Result<Upserted, RepositoryError> {
        let now = Utc::now();
        let mut state = self.state();

        if let Some(user) = state.users.get_mut(email.as_str()) {
            user.profile.extend(profile);
            user.updated_at = now;
            return Ok(Upserted::Updated);
        }

        state.users.insert(
            email.as_str().to_owned(),
            User {
                email: email.clone(),
                role: Role::User,
                profile,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(Upserted::Inserted)
    }

    async fn set_role(&self, email: &Email, role: Role) -> Result<bool, RepositoryError> {
        let mut state = self.state();
        let Some(user) = state.users.get_mut(email.as_str()) else {
            return Ok(false);
        };
        user.role = role;
        user.updated_at = Utc::now();
        Ok(true)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let now = Utc::now();
        let order = Order {
            id: OrderId::generate(),
            email: order.email,
            price: order.price,
            status: order.status,
            description: order.description,
            phone: order.phone,
            paid: false,
            transaction_id: None,
            details: order.details,
            created_at: now,
            updated_at: now,
        };
        self.state().orders.push(order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.state().orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.state().orders.iter().rev().cloned().collect())
    }

    async fn list_by_email(&self, email: &Email) -> Result<Vec<Order>, RepositoryError> {
        Ok(self
            .state()
            .orders
            .iter()
            .rev()
            .filter(|o| &o.email == email)
            .cloned()
            .collect())
    }

    async fn upsert(&self, id: OrderId, update: OrderUpdate) -> Result<Upserted, RepositoryError> {
        let now = Utc::now();
        let mut state = self.state();

        if let Some(order) = state.orders.iter_mut().find(|o| o.id == id) {
            order.email = update.email;
            order.price = update.price;
            order.status = update.status;
            order.description = update.description;
            order.phone = update.phone;
            order.updated_at = now;
            return Ok(Upserted::Updated);
        }

        state.orders.push(Order {
            id,
            email: update.email,
            price: update.price,
            status: update.status,
            description: update.description,
            phone: update.phone,
            paid: false,
            transaction_id: None,
            details: Map::new(),
            created_at: now,
            updated_at: now,
        });
        Ok(Upserted::Inserted)
    }

    async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let mut state = self.state();
        let before = state.orders.len();
        state.orders.retain(|o| o.id != id);
        Ok(state.orders.len() < before)
    }

    async fn mark_paid(&self, id: OrderId, transaction_id: &str) -> Result<bool, RepositoryError> {
        let mut state = self.state();
        let Some(order) = state.orders.iter_mut().find(|o| o.id == id && !o.paid) else {
            return Ok(false);
        };
        order.paid = true;
        order.transaction_id = Some(transaction_id.to_owned());
        order.updated_at = Utc::now();
        Ok(true)
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn insert(&self, payment: NewPayment) -> Result<Payment, RepositoryError> {
        let payment = Payment {
            id: PaymentId::generate(),
            order_id: payment.order_id,
            transaction_id: payment.transaction_id,
            payload: payment.payload,
            created_at: Utc::now(),
        };
        self.state().payments.push(payment.clone());
        Ok(payment)
    }

    async fn delete(&self, id: PaymentId) -> Result<bool, RepositoryError> {
        let mut state = self.state();
        let before = state.payments.len();
        state.payments.retain(|p| p.id != id);
        Ok(state.payments.len() < before)
    }

    async fn list_for_order(&self, order_id: OrderId) -> Result<Vec<Payment>, RepositoryError> {
        Ok(self
            .state()
            .payments
            .iter()
            .filter(|p| p.order_id == order_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(
        &self,
        collection: Collection,
        body: Map<String, Value>,
    ) -> Result<Document, RepositoryError> {
        let document = Document {
            id: DocumentId::generate(),
            body,
        };
        self.state().documents.push((collection, document.clone()));
        Ok(document)
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, RepositoryError> {
        Ok(self
            .state()
            .documents
            .iter()
            .filter(|(c, _)| *c == collection)
            .map(|(_, d)| d.clone())
            .collect())
    }

    async fn find_by_email(
        &self,
        collection: Collection,
        email: &Email,
    ) -> Result<Vec<Document>, RepositoryError> {
        Ok(self
            .state()
            .documents
            .iter()
            .filter(|(c, d)| {
                *c == collection
                    && d.body.get("email").and_then(Value::as_str) == Some(email.as_str())
            })
            .map(|(_, d)| d.clone())
            .collect())
    }

    async fn get(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<Option<Document>, RepositoryError> {
        Ok(self
            .state()
            .documents
            .iter()
            .find(|(c, d)| *c == collection && d.id == id)
            .map(|(_, d)| d.clone()))
    }

    async fn merge(
        &self,
        collection: Collection,
        id: DocumentId,
        fields: Map<String, Value>,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state();
        let Some((_, document)) = state
            .documents
            .iter_mut()
            .find(|(c, d)| *c == collection && d.id == id)
        else {
            return Ok(false);
        };
        document.body.extend(fields);
        Ok(true)
    }

    async fn delete(&self, collection: Collection, id: DocumentId) -> Result<bool, RepositoryError> {
        let mut state = self.state();
        let before = state.documents.len();
        state
            .documents
            .retain(|(c, d)| !(*c == collection && d.id == id));
        Ok(state.documents.len() < before)
    }
}
