use axum::extract::State;

use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    routes::health::health_check,
    state::AppState,
};

#[tokio::test]
async fn health_check_reports_database_reachability() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let state = AppState {
        orm,
        config: AppConfig {
            database_url,
            host: "127.0.0.1".into(),
            port: 0,
            jwt_secret: "test-secret".into(),
            token_ttl: 3600,
        },
    };

    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.database, "ok");

    Ok(())
}
