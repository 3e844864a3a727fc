//! In-memory order repository for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::domain::conversation::Order;
use crate::domain::foundation::OrderId;
use crate::ports::{OrderRepository, OrderRepositoryError};

/// In-memory order repository with failure injection.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned; acceptable for test
/// code only.
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<OrderId, Order>>,
    failing: AtomicBool,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent call fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Seeds an existing order (test setup).
    pub fn seed(&self, order: Order) {
        self.orders
            .write()
            .expect("orders lock poisoned")
            .insert(order.id.clone(), order);
    }

    pub fn len(&self) -> usize {
        self.orders.read().expect("orders lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<(), OrderRepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(OrderRepositoryError::Database(
                "simulated failure".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for InMemoryOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), OrderRepositoryError> {
        self.check_available()?;
        self.orders
            .write()
            .expect("orders lock poisoned")
            .insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        self.check_available()?;
        Ok(self
            .orders
            .read()
            .expect("orders lock poisoned")
            .get(id)
            .cloned())
    }
}
