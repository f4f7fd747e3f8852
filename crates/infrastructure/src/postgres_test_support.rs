use orbita_core::TenantId;
use orbita_domain::UserId;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connects to `DATABASE_URL` and migrates; `None` skips database tests.
pub(crate) async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres tests: {error}");
    }

    Some(pool)
}

pub(crate) async fn ensure_tenant(pool: &PgPool, tenant_id: TenantId, name: &str) {
    let insert = sqlx::query(
        r#"
            INSERT INTO tenants (id, name)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
    )
    .bind(tenant_id.as_uuid())
    .bind(name)
    .execute(pool)
    .await;

    assert!(insert.is_ok());
}

pub(crate) async fn ensure_user(pool: &PgPool, user_id: UserId, email_verified: bool) {
    let insert = sqlx::query(
        r#"
            INSERT INTO users (id, email, email_verified)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
    )
    .bind(user_id.as_uuid())
    .bind(format!("{user_id}@orbita.test"))
    .bind(email_verified)
    .execute(pool)
    .await;

    assert!(insert.is_ok());
}
