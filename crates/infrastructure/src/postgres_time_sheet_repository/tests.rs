use chrono::{DateTime, Duration, TimeZone, Utc};
use orbita_application::{SessionQuery, TimeSheetRepository};
use orbita_core::{AppError, TenantId};
use orbita_domain::{GeoPoint, TimeSheetConfig, TimeSheetSession, UserId};
use rust_decimal::Decimal;

use crate::postgres_test_support::{ensure_tenant, ensure_user, test_pool};

use super::PostgresTimeSheetRepository;

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("test"))
}

fn open_session(tenant_id: TenantId, owner: UserId, hour: u32) -> TimeSheetSession {
    let location = GeoPoint::new(-23.55, -46.63).ok();
    TimeSheetSession::open(tenant_id, owner, at(hour), location)
}

#[tokio::test]
async fn closed_session_round_trips() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresTimeSheetRepository::new(pool.clone());
    let tenant_id = TenantId::new();
    let owner = UserId::new();
    ensure_tenant(&pool, tenant_id, "Ponto Tenant").await;
    ensure_user(&pool, owner, true).await;

    let mut session = open_session(tenant_id, owner, 8);
    assert!(repository.create_session(session.clone()).await.is_ok());
    assert_eq!(
        repository.find_open_session(owner).await.ok().flatten(),
        Some(session.clone())
    );

    let config = TimeSheetConfig {
        hourly_rate: Decimal::from(10),
        ..TimeSheetConfig::default()
    };
    assert!(
        session
            .close(at(8) + Duration::seconds(3_723), None, &config)
            .is_ok()
    );
    assert!(repository.save_session(session.clone()).await.is_ok());

    let stored = repository.find_session(session.id).await.ok().flatten();
    assert_eq!(stored, Some(session));
    assert!(matches!(repository.find_open_session(owner).await, Ok(None)));
}

#[tokio::test]
async fn second_open_session_conflicts() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresTimeSheetRepository::new(pool.clone());
    let tenant_id = TenantId::new();
    let owner = UserId::new();
    ensure_tenant(&pool, tenant_id, "Ponto Tenant").await;
    ensure_user(&pool, owner, true).await;

    assert!(
        repository
            .create_session(open_session(tenant_id, owner, 8))
            .await
            .is_ok()
    );
    let result = repository
        .create_session(open_session(tenant_id, owner, 9))
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn listing_filters_owner_and_range_newest_first() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresTimeSheetRepository::new(pool.clone());
    let tenant_id = TenantId::new();
    let owner = UserId::new();
    let colleague = UserId::new();
    ensure_tenant(&pool, tenant_id, "Ponto Tenant").await;
    ensure_user(&pool, owner, true).await;
    ensure_user(&pool, colleague, true).await;

    let config = TimeSheetConfig::default();
    for (user, hour) in [(owner, 7), (owner, 10), (colleague, 9)] {
        let mut session = open_session(tenant_id, user, hour);
        assert!(session.close(at(hour) + Duration::hours(1), None, &config).is_ok());
        assert!(repository.create_session(session).await.is_ok());
    }

    let own = repository
        .list_sessions(SessionQuery {
            tenant_id,
            owner_user_id: Some(owner),
            started_from: None,
            started_before: None,
            limit: 10,
        })
        .await
        .unwrap_or_default();
    assert_eq!(own.len(), 2);
    assert_eq!(own[0].start, at(10));

    let morning = repository
        .list_sessions(SessionQuery {
            tenant_id,
            owner_user_id: None,
            started_from: Some(at(8)),
            started_before: Some(at(10)),
            limit: 10,
        })
        .await
        .unwrap_or_default();
    assert_eq!(morning.len(), 1);
    assert_eq!(morning[0].owner_user_id, colleague);
}
