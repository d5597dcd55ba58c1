use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::items::{CreateItemRequest, ItemList, UpdateItemRequest},
    entity::items::{
        ActiveModel as ItemActive, Column as ItemCol, Entity as Items, Model as ItemModel,
    },
    error::{AppError, AppResult},
    models::Item,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_items(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<ItemList>> {
    let (offset, limit) = pagination.normalize();
    let finder = Items::find().order_by_asc(ItemCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(item_from_entity)
        .collect();

    let meta = Meta::new(offset, limit, total);
    Ok(ApiResponse::success("Items", ItemList { items }, Some(meta)))
}

pub async fn get_item(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Item>> {
    let item = Items::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(item_from_entity);
    let item = match item {
        Some(i) => i,
        None => return Err(AppError::not_found("Item")),
    };
    Ok(ApiResponse::success("Item", item, None))
}

pub async fn get_item_by_name(state: &AppState, name: &str) -> AppResult<Option<ItemModel>> {
    let item = Items::find()
        .filter(ItemCol::Name.eq(name))
        .one(&state.orm)
        .await?;
    Ok(item)
}

pub async fn create_item(
    state: &AppState,
    payload: CreateItemRequest,
) -> AppResult<ApiResponse<Item>> {
    validate_price(payload.price)?;
    validate_stock(payload.stock)?;

    let active = ItemActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        stock: Set(payload.stock),
        image_url: Set(payload.image_url),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let item = active.insert(&state.orm).await?;

    tracing::debug!(item_id = %item.id, "item created");

    Ok(ApiResponse::success(
        "Item created",
        item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn update_item(
    state: &AppState,
    id: Uuid,
    payload: UpdateItemRequest,
) -> AppResult<ApiResponse<Item>> {
    let existing = Items::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(i) => i,
        None => return Err(AppError::not_found("Item")),
    };

    let mut active: ItemActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
        active.price = Set(price);
    }
    if let Some(stock) = payload.stock {
        validate_stock(stock)?;
        active.stock = Set(stock);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    active.updated_at = Set(Utc::now().into());

    let item = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn delete_item(state: &AppState, id: Uuid) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Items::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("Item"));
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn validate_price(price: Decimal) -> AppResult<()> {
    if price <= Decimal::ZERO {
        return Err(AppError::validation("price", "must be positive"));
    }
    Ok(())
}

fn validate_stock(stock: i32) -> AppResult<()> {
    if stock < 0 {
        return Err(AppError::validation("stock", "must not be negative"));
    }
    Ok(())
}

pub(crate) fn item_from_entity(model: ItemModel) -> Item {
    Item {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        stock: model.stock,
        image_url: model.image_url,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_must_be_positive() {
        assert!(validate_price(Decimal::from(1)).is_ok());
        assert!(validate_price(Decimal::ZERO).is_err());
        assert!(validate_price(Decimal::from(-5)).is_err());
    }

    #[test]
    fn stock_must_not_be_negative() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
    }
}
