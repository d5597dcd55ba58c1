use rust_decimal::Decimal;
use uuid::Uuid;

use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        items::CreateItemRequest,
        orders::{CreateOrderRequest, OrderLineRequest},
        users::CreateUserRequest,
    },
    routes::params::{OrderListQuery, Pagination},
    services::{item_service, order_service, user_service},
    state::AppState,
};

/// Development data generation. All rows go through the service layer so the
/// seeded database looks exactly like one populated over the API.
struct Seeder {
    state: AppState,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let seeder = Seeder {
        state: AppState { orm, config },
    };

    let admin_id = seeder
        .ensure_user("admin@example.com", "admin-pass-123", "Admin", true)
        .await?;
    let user_id = seeder
        .ensure_user("user@example.com", "user-pass-123", "Regular User", false)
        .await?;
    let item_ids = seeder.ensure_items().await?;
    seeder.ensure_sample_order(user_id, &item_ids).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

impl Seeder {
    async fn ensure_user(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        is_superuser: bool,
    ) -> anyhow::Result<Uuid> {
        if let Some(existing) = user_service::get_user_by_email(&self.state, email).await? {
            println!("User {email} already present");
            return Ok(existing.id);
        }

        let resp = user_service::create_user(
            &self.state,
            CreateUserRequest {
                email: email.to_string(),
                password: password.to_string(),
                full_name: Some(full_name.to_string()),
                is_active: Some(true),
                is_superuser: Some(is_superuser),
            },
        )
        .await?;
        let user = resp
            .data
            .ok_or_else(|| anyhow::anyhow!("create_user returned no data"))?;

        println!("Ensured user {email} (superuser={is_superuser})");
        Ok(user.id)
    }

    async fn ensure_items(&self) -> anyhow::Result<Vec<Uuid>> {
        let catalog = vec![
            ("Walnut Desk", "Solid walnut writing desk", 45000, 12),
            ("Desk Lamp", "Adjustable brass desk lamp", 7900, 40),
            ("Notebook Set", "Three ruled A5 notebooks", 1500, 200),
            ("Fountain Pen", "Fine-nib fountain pen", 6200, 75),
        ];

        let mut ids = Vec::with_capacity(catalog.len());
        for (name, description, price_cents, stock) in catalog {
            if let Some(existing) = item_service::get_item_by_name(&self.state, name).await? {
                ids.push(existing.id);
                continue;
            }

            let resp = item_service::create_item(
                &self.state,
                CreateItemRequest {
                    name: name.to_string(),
                    description: Some(description.to_string()),
                    price: Decimal::new(price_cents, 2),
                    stock,
                    image_url: None,
                },
            )
            .await?;
            let item = resp
                .data
                .ok_or_else(|| anyhow::anyhow!("create_item returned no data"))?;
            ids.push(item.id);
        }

        println!("Seeded {} catalog items", ids.len());
        Ok(ids)
    }

    async fn ensure_sample_order(&self, user_id: Uuid, item_ids: &[Uuid]) -> anyhow::Result<()> {
        let Some(&item_id) = item_ids.first() else {
            return Ok(());
        };

        let existing = order_service::list_orders(
            &self.state,
            OrderListQuery {
                pagination: Pagination::default(),
                user_id: Some(user_id),
            },
        )
        .await?;
        if existing.data.map_or(false, |list| !list.items.is_empty()) {
            println!("User already has orders, skipping sample order");
            return Ok(());
        }

        let resp = order_service::place_order(
            &self.state,
            CreateOrderRequest {
                user_id,
                status: None,
                shipping_address: Some("1-2-3 Example Street".to_string()),
                total_amount: None,
                notes: Some("seeded order".to_string()),
                items: vec![OrderLineRequest {
                    item_id,
                    quantity: 1,
                    price_at_time: None,
                }],
            },
        )
        .await?;

        let order = resp
            .data
            .ok_or_else(|| anyhow::anyhow!("place_order returned no data"))?
            .order;
        println!("Seeded order {} (total {})", order.id, order.total_amount);
        Ok(())
    }
}
