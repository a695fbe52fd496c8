use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use backend_domain::ports::BookingRepository;
use backend_domain::BookingPayment;

#[derive(Default)]
pub struct InMemoryBookingRepository {
    payments: RwLock<HashMap<String, BookingPayment>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn upsert_payment(&self, payment: BookingPayment) -> anyhow::Result<()> {
        self.payments
            .write()
            .await
            .insert(payment.order_id.clone(), payment);
        Ok(())
    }

    async fn get_payment(&self, order_id: &str) -> anyhow::Result<Option<BookingPayment>> {
        Ok(self.payments.read().await.get(order_id).cloned())
    }
}
