use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::orders::{CreateOrderRequest, OrderList, OrderWithItems, UpdateOrderRequest},
    entity::{
        items::{Column as ItemCol, Entity as Items, Model as ItemModel},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    models::{Order, OrderItem, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::item_service::item_from_entity,
    state::AppState,
};

/// Place an order together with its line items as one atomic unit.
///
/// The whole sequence runs in a single transaction with the touched item rows
/// locked (`SELECT ... FOR UPDATE`), so a failure at any step rolls everything
/// back and two concurrent placements cannot both pass the stock check.
pub async fn place_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.items.is_empty() {
        return Err(AppError::validation(
            "items",
            "must contain at least one line item",
        ));
    }

    let txn = state.orm.begin().await?;

    if Users::find_by_id(payload.user_id).one(&txn).await?.is_none() {
        return Err(AppError::not_found("User"));
    }

    // Resolve and lock every referenced item in submission order, snapshotting
    // the price each line will be charged at.
    let mut lines: Vec<(ItemModel, i32, Decimal)> = Vec::with_capacity(payload.items.len());
    let mut total = Decimal::ZERO;
    for line in &payload.items {
        if line.quantity <= 0 {
            return Err(AppError::validation("quantity", "must be positive"));
        }
        if let Some(price) = line.price_at_time {
            if price <= Decimal::ZERO {
                return Err(AppError::validation("price_at_time", "must be positive"));
            }
        }

        let item = Items::find_by_id(line.item_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let item = match item {
            Some(i) => i,
            None => {
                return Err(AppError::not_found(format!(
                    "Item with ID {}",
                    line.item_id
                )));
            }
        };

        if item.stock < line.quantity {
            return Err(AppError::InsufficientStock {
                item: item.name.clone(),
            });
        }

        let price_at_time = line.price_at_time.unwrap_or(item.price);
        total += price_at_time * Decimal::from(line.quantity);
        lines.push((item, line.quantity, price_at_time));
    }

    // A caller-declared total must agree with what the lines add up to.
    if let Some(declared) = payload.total_amount {
        if declared != total {
            return Err(AppError::validation(
                "total_amount",
                format!("does not match line total {total}"),
            ));
        }
    }

    let status = payload.status.unwrap_or(OrderStatus::Pending);
    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(payload.user_id),
        status: Set(status.as_str().to_string()),
        shipping_address: Set(payload.shipping_address),
        total_amount: Set(total),
        notes: Set(payload.notes),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::with_capacity(lines.len());
    for (item, quantity, price_at_time) in lines {
        let line = OrderItemActive {
            order_id: Set(order.id),
            item_id: Set(item.id),
            quantity: Set(quantity),
            price_at_time: Set(price_at_time),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;

        Items::update_many()
            .col_expr(ItemCol::Stock, Expr::col(ItemCol::Stock).sub(quantity))
            .filter(ItemCol::Id.eq(item.id))
            .exec(&txn)
            .await?;

        // The returned item reflects the stock remaining after this order.
        let mut item = item;
        item.stock -= quantity;

        order_items.push(OrderItem {
            order_id: line.order_id,
            item_id: line.item_id,
            quantity: line.quantity,
            price_at_time: line.price_at_time,
            item: Some(item_from_entity(item)),
            created_at: line.created_at.with_timezone(&Utc),
        });
    }

    txn.commit().await?;

    tracing::info!(order_id = %order.id, total = %total, "order placed");

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems {
            order: order_from_entity(order)?,
            items: order_items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (offset, limit) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(user_id) = query.user_id {
        condition = condition.add(OrderCol::UserId.eq(user_id));
    }

    let finder = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut lines_by_order = load_lines(&state.orm, order_ids).await?;

    let mut items = Vec::with_capacity(orders.len());
    for order in orders {
        let lines = lines_by_order.remove(&order.id).unwrap_or_default();
        items.push(OrderWithItems {
            order: order_from_entity(order)?,
            items: lines,
        });
    }

    let meta = Meta::new(offset, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::not_found("Order")),
    };

    let mut lines_by_order = load_lines(&state.orm, vec![order.id]).await?;
    let items = lines_by_order.remove(&order.id).unwrap_or_default();

    Ok(ApiResponse::success(
        "Order",
        OrderWithItems {
            order: order_from_entity(order)?,
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Patch status, shipping address and notes. Any status value is accepted at
/// any time; the transition graph is intentionally not validated.
pub async fn update_order(
    state: &AppState,
    id: Uuid,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::not_found("Order")),
    };

    let mut active: OrderActive = existing.into();
    if let Some(status) = payload.status {
        active.status = Set(status.as_str().to_string());
    }
    if let Some(shipping_address) = payload.shipping_address {
        active.shipping_address = Set(Some(shipping_address));
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(Some(notes));
    }
    active.updated_at = Set(Utc::now().into());

    let order = active.update(&state.orm).await?;

    let mut lines_by_order = load_lines(&state.orm, vec![order.id]).await?;
    let items = lines_by_order.remove(&order.id).unwrap_or_default();

    Ok(ApiResponse::success(
        "Updated",
        OrderWithItems {
            order: order_from_entity(order)?,
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Hard delete; line items go with the order via the cascading foreign key.
/// Stock consumed by the order is not restored.
pub async fn delete_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Orders::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("Order"));
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Fetch the line items for a set of orders with each line's item resolved in
/// one query, grouped by order id.
async fn load_lines<C: ConnectionTrait>(
    conn: &C,
    order_ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, Vec<OrderItem>>> {
    let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    if order_ids.is_empty() {
        return Ok(by_order);
    }

    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .find_also_related(Items)
        .all(conn)
        .await?;

    for (line, item) in rows {
        by_order
            .entry(line.order_id)
            .or_default()
            .push(line_from_entity(line, item));
    }

    Ok(by_order)
}

fn order_from_entity(model: OrderModel) -> AppResult<Order> {
    let status = OrderStatus::parse(&model.status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("unknown order status {:?}", model.status))
    })?;
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        status,
        shipping_address: model.shipping_address,
        total_amount: model.total_amount,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn line_from_entity(model: OrderItemModel, item: Option<ItemModel>) -> OrderItem {
    OrderItem {
        order_id: model.order_id,
        item_id: model.item_id,
        quantity: model.quantity,
        price_at_time: model.price_at_time,
        item: item.map(item_from_entity),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
