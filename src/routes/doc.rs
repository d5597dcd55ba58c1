use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiSpec;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        items::{CreateItemRequest, ItemList, UpdateItemRequest},
        orders::{CreateOrderRequest, OrderLineRequest, OrderList, OrderWithItems, UpdateOrderRequest},
        users::{CreateUserRequest, UpdateUserRequest, UserList},
    },
    models::{Item, Order, OrderItem, OrderStatus, User},
    response::{ApiResponse, Meta},
    routes::{health, items, orders, params, users},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        items::list_items,
        items::create_item,
        items::get_item,
        items::update_item,
        items::delete_item,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::update_order,
        orders::delete_order
    ),
    components(
        schemas(
            User,
            Item,
            Order,
            OrderItem,
            OrderStatus,
            CreateUserRequest,
            UpdateUserRequest,
            UserList,
            CreateItemRequest,
            UpdateItemRequest,
            ItemList,
            CreateOrderRequest,
            OrderLineRequest,
            UpdateOrderRequest,
            OrderList,
            OrderWithItems,
            params::Pagination,
            params::OrderListQuery,
            Meta,
            ApiResponse<User>,
            ApiResponse<UserList>,
            ApiResponse<Item>,
            ApiResponse<ItemList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Users", description = "User endpoints"),
        (name = "Items", description = "Catalog item endpoints"),
        (name = "Orders", description = "Order endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
