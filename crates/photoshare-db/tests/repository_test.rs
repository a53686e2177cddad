//! Integration tests for Tenant, User, and Session repository
//! implementations using in-memory SurrealDB.

use photoshare_core::error::CoreError;
use photoshare_core::models::session::CreateSession;
use photoshare_core::models::tenant::{CreateTenant, UpdateTenant};
use photoshare_core::models::user::{CreateUser, Role};
use photoshare_core::repository::{
    Pagination, SessionRepository, TenantRepository, UserRepository,
};
use photoshare_db::repository::{
    SurrealSessionRepository, SurrealTenantRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    photoshare_db::run_migrations(&db).await.unwrap();
    db
}

fn create_tenant_input(code: &str, name: &str) -> CreateTenant {
    CreateTenant {
        code: code.into(),
        name: name.into(),
    }
}

fn create_user_input(email: &str, tenant_id: Option<Uuid>) -> CreateUser {
    CreateUser {
        email: email.into(),
        password_hash: "$argon2id$stub".into(),
        first_name: "Test".into(),
        last_name: "User".into(),
        tenant_id,
        role: Role::Member,
    }
}

// -----------------------------------------------------------------------
// Tenant tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_tenant() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo
        .create(create_tenant_input("ABC12XYZ", "First Church"))
        .await
        .unwrap();

    assert_eq!(tenant.code, "ABC12XYZ");
    assert_eq!(tenant.name, "First Church");
    assert!(tenant.is_active);

    let fetched = repo.get_by_id(tenant.id).await.unwrap();
    assert_eq!(fetched.id, tenant.id);
    assert_eq!(fetched.code, tenant.code);
}

#[tokio::test]
async fn get_tenant_by_code() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo
        .create(create_tenant_input("CODE1234", "Code Church"))
        .await
        .unwrap();

    let fetched = repo.get_by_code("CODE1234").await.unwrap();
    assert_eq!(fetched.id, tenant.id);

    let missing = repo.get_by_code("NOPE0000").await;
    assert!(matches!(missing, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn tenant_code_is_globally_unique() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    repo.create(create_tenant_input("SAME1234", "First"))
        .await
        .unwrap();
    let dup = repo.create(create_tenant_input("SAME1234", "Second")).await;
    assert!(dup.is_err(), "duplicate code must be rejected");
}

#[tokio::test]
async fn rotate_code_changes_lookup_but_not_id() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo
        .create(create_tenant_input("OLD11111", "Rotating"))
        .await
        .unwrap();

    let rotated = repo.rotate_code(tenant.id, "NEW22222").await.unwrap();
    assert_eq!(rotated.id, tenant.id);
    assert_eq!(rotated.code, "NEW22222");

    assert!(repo.get_by_code("OLD11111").await.is_err());
    assert_eq!(repo.get_by_code("NEW22222").await.unwrap().id, tenant.id);
}

#[tokio::test]
async fn deactivate_and_reactivate_tenant() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo
        .create(create_tenant_input("TOGGLE12", "Toggled"))
        .await
        .unwrap();

    let off = repo.set_active(tenant.id, false).await.unwrap();
    assert!(!off.is_active);

    let on = repo.set_active(tenant.id, true).await.unwrap();
    assert!(on.is_active);
}

#[tokio::test]
async fn update_tenant_branding() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo
        .create(create_tenant_input("BRAND123", "Branded"))
        .await
        .unwrap();

    let updated = repo
        .update(
            tenant.id,
            UpdateTenant {
                logo_path: Some(Some("tenants/x/branding/logo.png".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        updated.logo_path.as_deref(),
        Some("tenants/x/branding/logo.png")
    );
    assert_eq!(updated.name, "Branded");

    let cleared = repo
        .update(
            tenant.id,
            UpdateTenant {
                logo_path: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.logo_path.is_none());
}

#[tokio::test]
async fn list_tenants_with_pagination() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    for i in 0..5 {
        repo.create(create_tenant_input(
            &format!("LIST000{i}"),
            &format!("Church {i}"),
        ))
        .await
        .unwrap();
    }

    let page = repo
        .list(Pagination {
            offset: 0,
            limit: 3,
        })
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 3);

    let rest = repo
        .list(Pagination {
            offset: 3,
            limit: 3,
        })
        .await
        .unwrap();
    assert_eq!(rest.items.len(), 2);
}

// -----------------------------------------------------------------------
// User tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_user() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo
        .create(create_user_input("alice@example.com", None))
        .await
        .unwrap();

    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.tenant_id, None);
    assert_eq!(user.role, Role::Member);

    let by_email = repo.get_by_email("alice@example.com").await.unwrap();
    assert_eq!(by_email.id, user.id);
}

#[tokio::test]
async fn email_is_globally_unique() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    repo.create(create_user_input("dup@example.com", None))
        .await
        .unwrap();
    let dup = repo.create(create_user_input("dup@example.com", None)).await;
    assert!(dup.is_err(), "duplicate email must be rejected");
}

#[tokio::test]
async fn tenant_assignment_is_one_shot() {
    let db = setup().await;
    let tenants = SurrealTenantRepository::new(db.clone());
    let users = SurrealUserRepository::new(db);

    let a = tenants
        .create(create_tenant_input("TENANTAA", "A"))
        .await
        .unwrap();
    let b = tenants
        .create(create_tenant_input("TENANTBB", "B"))
        .await
        .unwrap();

    let user = users
        .create(create_user_input("bob@example.com", None))
        .await
        .unwrap();

    let assigned = users.assign_tenant(user.id, a.id, false).await.unwrap();
    assert_eq!(assigned.tenant_id, Some(a.id));

    // Second assignment without override fails and changes nothing.
    let err = users.assign_tenant(user.id, b.id, false).await.unwrap_err();
    assert!(matches!(err, CoreError::AlreadyAssigned));
    assert_eq!(
        users.get_by_id(user.id).await.unwrap().tenant_id,
        Some(a.id)
    );

    // The privileged override is the only reassignment path.
    let moved = users.assign_tenant(user.id, b.id, true).await.unwrap();
    assert_eq!(moved.tenant_id, Some(b.id));
}

#[tokio::test]
async fn assign_tenant_unknown_user_is_not_found() {
    let db = setup().await;
    let tenants = SurrealTenantRepository::new(db.clone());
    let users = SurrealUserRepository::new(db);

    let t = tenants
        .create(create_tenant_input("TENANTCC", "C"))
        .await
        .unwrap();
    let err = users
        .assign_tenant(Uuid::new_v4(), t.id, false)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

#[tokio::test]
async fn list_and_count_users_by_tenant() {
    let db = setup().await;
    let tenants = SurrealTenantRepository::new(db.clone());
    let users = SurrealUserRepository::new(db);

    let t = tenants
        .create(create_tenant_input("TENANTDD", "D"))
        .await
        .unwrap();
    for i in 0..3 {
        users
            .create(create_user_input(&format!("u{i}@example.com"), Some(t.id)))
            .await
            .unwrap();
    }
    users
        .create(create_user_input("other@example.com", None))
        .await
        .unwrap();

    assert_eq!(users.count_by_tenant(t.id).await.unwrap(), 3);
    let page = users.list_by_tenant(t.id, Pagination::default()).await.unwrap();
    assert_eq!(page.total, 3);
    assert!(page.items.iter().all(|u| u.tenant_id == Some(t.id)));
}

// -----------------------------------------------------------------------
// Session tests
// -----------------------------------------------------------------------

fn session_input(token_hash: &str) -> CreateSession {
    CreateSession {
        user_id: Uuid::new_v4(),
        tenant_id: Some(Uuid::new_v4()),
        token_hash: token_hash.into(),
        expires_at: chrono::Utc::now() + chrono::Duration::days(7),
    }
}

#[tokio::test]
async fn consume_marks_session_revoked() {
    let db = setup().await;
    let repo = SurrealSessionRepository::new(db);

    let created = repo.create(session_input("hash-1")).await.unwrap();
    assert!(created.revoked_at.is_none());

    let consumed = repo.consume("hash-1").await.unwrap();
    assert_eq!(consumed.id, created.id);

    // A second consume observes the revocation, not a missing token.
    let err = repo.consume("hash-1").await.unwrap_err();
    assert!(matches!(err, CoreError::TokenRevoked));
}

#[tokio::test]
async fn consume_unknown_token_fails_closed() {
    let db = setup().await;
    let repo = SurrealSessionRepository::new(db);

    let err = repo.consume("never-issued").await.unwrap_err();
    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn concurrent_consume_has_exactly_one_winner() {
    let db = setup().await;
    let repo = SurrealSessionRepository::new(db);

    repo.create(session_input("contested")).await.unwrap();

    let (a, b) = tokio::join!(repo.consume("contested"), repo.consume("contested"));

    let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one rotation may succeed");

    let loser = if a.is_err() { a } else { b };
    assert!(matches!(loser.unwrap_err(), CoreError::TokenRevoked));
}

#[tokio::test]
async fn revoke_is_idempotent() {
    let db = setup().await;
    let repo = SurrealSessionRepository::new(db);

    repo.create(session_input("logout-hash")).await.unwrap();

    repo.revoke("logout-hash").await.unwrap();
    repo.revoke("logout-hash").await.unwrap();
    repo.revoke("never-existed").await.unwrap();

    let err = repo.consume("logout-hash").await.unwrap_err();
    assert!(matches!(err, CoreError::TokenRevoked));
}

#[tokio::test]
async fn revoke_user_sessions_counts_live_sessions() {
    let db = setup().await;
    let repo = SurrealSessionRepository::new(db);

    let user_id = Uuid::new_v4();
    for i in 0..3 {
        repo.create(CreateSession {
            user_id,
            tenant_id: None,
            token_hash: format!("user-hash-{i}"),
            expires_at: chrono::Utc::now() + chrono::Duration::days(1),
        })
        .await
        .unwrap();
    }

    assert_eq!(repo.revoke_user_sessions(user_id).await.unwrap(), 3);
    assert_eq!(repo.revoke_user_sessions(user_id).await.unwrap(), 0);
}

#[tokio::test]
async fn cleanup_removes_only_expired() {
    let db = setup().await;
    let repo = SurrealSessionRepository::new(db);

    repo.create(CreateSession {
        user_id: Uuid::new_v4(),
        tenant_id: None,
        token_hash: "expired".into(),
        expires_at: chrono::Utc::now() - chrono::Duration::hours(1),
    })
    .await
    .unwrap();
    repo.create(session_input("live")).await.unwrap();

    assert_eq!(repo.cleanup_expired().await.unwrap(), 1);
    assert!(repo.consume("live").await.is_ok());
}
