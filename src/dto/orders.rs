use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem, OrderStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub item_id: Uuid,
    pub quantity: i32,
    /// Snapshot price. Defaults to the item's current price when absent.
    pub price_at_time: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
    pub status: Option<OrderStatus>,
    pub shipping_address: Option<String>,
    /// Optional cross-check; when supplied it must equal the computed line
    /// total or the request is rejected.
    pub total_amount: Option<Decimal>,
    pub notes: Option<String>,
    pub items: Vec<OrderLineRequest>,
}

/// Only status, address and notes are updatable after placement.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderWithItems>,
}
