use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        items::{CreateItemRequest, UpdateItemRequest},
        users::{CreateUserRequest, UpdateUserRequest},
    },
    entity::users::ActiveModel as UserActive,
    error::AppError,
    services::{item_service, user_service},
    state::AppState,
};

#[tokio::test]
async fn user_crud_round_trip_and_email_conflict() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    clear_user(&state, "crud@example.com").await?;

    let created = user_service::create_user(
        &state,
        CreateUserRequest {
            email: "crud@example.com".to_string(),
            password: "password-123".to_string(),
            full_name: Some("First Last".to_string()),
            is_active: None,
            is_superuser: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert!(created.is_active);
    assert!(!created.is_superuser);

    // Create-then-fetch returns field-identical data.
    let fetched = user_service::get_user(&state, created.id).await?.data.unwrap();
    assert_eq!(fetched.email, created.email);
    assert_eq!(fetched.full_name, created.full_name);
    assert_eq!(fetched.is_active, created.is_active);
    assert_eq!(fetched.is_superuser, created.is_superuser);

    // Same email again is a conflict and the original row is untouched.
    let err = user_service::create_user(
        &state,
        CreateUserRequest {
            email: "crud@example.com".to_string(),
            password: "another-pass".to_string(),
            full_name: None,
            is_active: None,
            is_superuser: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    let unchanged = user_service::get_user(&state, created.id).await?.data.unwrap();
    assert_eq!(unchanged.full_name.as_deref(), Some("First Last"));

    // Partial patch: only full_name changes.
    let patched = user_service::update_user(
        &state,
        created.id,
        UpdateUserRequest {
            full_name: Some("New Name".to_string()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(patched.full_name.as_deref(), Some("New Name"));
    assert_eq!(patched.email, created.email);
    assert_eq!(patched.is_active, created.is_active);
    assert_eq!(patched.is_superuser, created.is_superuser);

    // Password survives the patch: the stored hash still verifies the
    // original password.
    let row = user_service::get_user_by_email(&state, "crud@example.com")
        .await?
        .unwrap();
    assert!(storefront_api::security::verify_password(
        "password-123",
        &row.hashed_password
    ));

    user_service::delete_user(&state, created.id).await?;
    let err = user_service::get_user(&state, created.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}

// The service pre-checks the email before inserting, but two concurrent
// creates can both pass that check. Writing the duplicate row directly
// exercises the path where only the unique index catches it.
#[tokio::test]
async fn duplicate_email_insert_racing_past_precheck_is_a_conflict() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    clear_user(&state, "race@example.com").await?;

    let first = user_service::create_user(
        &state,
        CreateUserRequest {
            email: "race@example.com".to_string(),
            password: "password-123".to_string(),
            full_name: None,
            is_active: None,
            is_superuser: None,
        },
    )
    .await?
    .data
    .unwrap();

    let duplicate = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set("race@example.com".to_string()),
        hashed_password: Set(storefront_api::security::hash_password("another-pass")?),
        full_name: Set(None),
        is_active: Set(true),
        is_superuser: Set(false),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let err = duplicate
        .insert(&state.orm)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "email already registered"))
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // The original row survives the rejected insert.
    let unchanged = user_service::get_user(&state, first.id).await?.data.unwrap();
    assert_eq!(unchanged.email, "race@example.com");

    Ok(())
}

#[tokio::test]
async fn item_crud_round_trip_and_validation() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let err = item_service::create_item(
        &state,
        CreateItemRequest {
            name: "Bad Item".to_string(),
            description: None,
            price: Decimal::ZERO,
            stock: 1,
            image_url: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "price"));

    let created = item_service::create_item(
        &state,
        CreateItemRequest {
            name: "Round Trip Item".to_string(),
            description: Some("described".to_string()),
            price: Decimal::new(1999, 2),
            stock: 7,
            image_url: Some("https://example.com/i.png".to_string()),
        },
    )
    .await?
    .data
    .unwrap();

    let fetched = item_service::get_item(&state, created.id).await?.data.unwrap();
    assert_eq!(fetched.name, created.name);
    assert_eq!(fetched.description, created.description);
    assert_eq!(fetched.price, Decimal::new(1999, 2));
    assert_eq!(fetched.stock, 7);
    assert_eq!(fetched.image_url, created.image_url);

    // Patch only the stock; everything else is untouched.
    let patched = item_service::update_item(
        &state,
        created.id,
        UpdateItemRequest {
            stock: Some(3),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(patched.stock, 3);
    assert_eq!(patched.price, fetched.price);
    assert_eq!(patched.name, fetched.name);

    let err = item_service::update_item(
        &state,
        created.id,
        UpdateItemRequest {
            stock: Some(-1),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation { ref field, .. } if field == "stock"));

    item_service::delete_item(&state, created.id).await?;
    let err = item_service::get_item(&state, created.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    Ok(())
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        token_ttl: 3600,
    };

    Ok(Some(AppState { orm, config }))
}

async fn clear_user(state: &AppState, email: &str) -> anyhow::Result<()> {
    let backend = state.orm.get_database_backend();
    state
        .orm
        .execute(Statement::from_sql_and_values(
            backend,
            "DELETE FROM orders WHERE user_id IN (SELECT id FROM users WHERE email = $1)",
            [email.into()],
        ))
        .await?;
    state
        .orm
        .execute(Statement::from_sql_and_values(
            backend,
            "DELETE FROM users WHERE email = $1",
            [email.into()],
        ))
        .await?;
    Ok(())
}
