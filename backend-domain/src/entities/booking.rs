// Booking payment projection written by webhook effects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{PaymentEventType, PaymentState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingPayment {
    pub order_id: String,
    pub state: PaymentState,
    pub last_event_type: PaymentEventType,
    pub updated_at: DateTime<Utc>,
}
