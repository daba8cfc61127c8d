//! The sales-order shape consumed when assigning a delivery.
//!
//! Orders are owned by the ordering screens and their own store; this crate
//! only reads them. Assigning a delivery never writes back to the order —
//! there is deliberately no status transition here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A registered sales order. `id` comes from the `ordersCounter` sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    pub customer_name: String,
    pub product_name: String,
    pub quantity: u32,
    pub delivery_address: String,
    pub requested_date: NaiveDate,
}
