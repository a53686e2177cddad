//! Authentication service — login, signup, tenant assignment, refresh
//! rotation, and logout orchestration.
//!
//! Generic over repository implementations so the auth layer has no
//! dependency on the database crate. Tenant deactivation blocks every
//! path that issues new credentials (login, signup, assignment, refresh);
//! already-issued access tokens run out their natural expiry.

use chrono::{Duration, Utc};
use photoshare_core::error::{CoreError, CoreResult};
use photoshare_core::models::session::CreateSession;
use photoshare_core::models::tenant::{self, Tenant};
use photoshare_core::models::user::{self, CreateUser, Role, User};
use photoshare_core::repository::{SessionRepository, TenantRepository, UserRepository};
use tracing::info;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::rate_limit::{RateLimitStore, RateLimiter};
use crate::token;

/// Rate-limit operation key for tenant-code attempts.
const OP_TENANT_JOIN: &str = "tenant_join";

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Input for the signup flow. The tenant code is optional: accounts can
/// be created first and joined to a tenant in a second step.
#[derive(Debug)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub tenant_code: Option<String>,
    /// Client identifier (network address) for rate limiting.
    pub identifier: Option<String>,
}

/// Input for the tenant assignment flow.
#[derive(Debug)]
pub struct AssignTenantInput {
    pub user_id: Uuid,
    pub tenant_code: String,
    /// Client identifier (network address) for rate limiting.
    pub identifier: Option<String>,
    /// Privileged reassignment: skips the one-shot check and the rate
    /// limiter. Only the platform console sets this.
    pub admin_override: bool,
}

/// A freshly issued credential pair.
#[derive(Debug)]
pub struct AuthTokens {
    /// Signed JWT access token.
    pub access_token: String,
    /// Raw opaque refresh token (returned to the client, never stored).
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Refresh session lifetime in seconds.
    pub refresh_expires_in: u64,
    /// Current user state at issuance.
    pub user: User,
}

/// Authentication service.
pub struct AuthService<U, T, S, L>
where
    U: UserRepository,
    T: TenantRepository,
    S: SessionRepository,
    L: RateLimitStore,
{
    user_repo: U,
    tenant_repo: T,
    session_repo: S,
    limiter: RateLimiter<L>,
    config: AuthConfig,
}

impl<U, T, S, L> AuthService<U, T, S, L>
where
    U: UserRepository,
    T: TenantRepository,
    S: SessionRepository,
    L: RateLimitStore,
{
    pub fn new(
        user_repo: U,
        tenant_repo: T,
        session_repo: S,
        limiter: RateLimiter<L>,
        config: AuthConfig,
    ) -> Self {
        Self {
            user_repo,
            tenant_repo,
            session_repo,
            limiter,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Authenticate with email + password and issue a token pair.
    pub async fn login(&self, input: LoginInput) -> CoreResult<AuthTokens> {
        let email = user::normalize_email(&input.email);

        let user = match self.user_repo.get_by_email(&email).await {
            Ok(u) => u,
            Err(CoreError::NotFound { .. }) => {
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }

        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }

        // A deactivated tenant blocks new credential issuance.
        self.check_tenant_issuable(&user).await?;

        self.issue_pair(user).await
    }

    /// Create a new member account, optionally joining a tenant via code
    /// in the same step, and issue a token pair.
    pub async fn signup(&self, input: SignupInput) -> CoreResult<AuthTokens> {
        if input.password.len() < self.config.min_password_length {
            return Err(AuthError::PasswordPolicy(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            ))
            .into());
        }

        let email = user::normalize_email(&input.email);
        if email.is_empty() || !email.contains('@') {
            return Err(CoreError::Validation {
                message: "a valid email address is required".into(),
            });
        }

        match self.user_repo.get_by_email(&email).await {
            Err(CoreError::NotFound { .. }) => {}
            Ok(_) => {
                return Err(CoreError::AlreadyExists {
                    entity: "user".into(),
                });
            }
            Err(e) => return Err(e),
        }

        let password_hash =
            password::hash_password(&input.password, self.config.pepper.as_deref())?;

        let mut user = self
            .user_repo
            .create(CreateUser {
                email,
                password_hash,
                first_name: input.first_name,
                last_name: input.last_name,
                tenant_id: None,
                role: Role::Member,
            })
            .await?;

        if let Some(code) = input.tenant_code {
            user = self
                .assign_tenant(AssignTenantInput {
                    user_id: user.id,
                    tenant_code: code,
                    identifier: input.identifier,
                    admin_override: false,
                })
                .await?;
        }

        info!(user = %user.id, "new account created");
        self.issue_pair(user).await
    }

    /// Resolve a tenant code and bind the user to that tenant.
    ///
    /// The code is a one-time join credential: the binding is permanent
    /// except via the privileged override. Attempts are rate-limited per
    /// client identifier, counting failures and successes alike.
    pub async fn assign_tenant(&self, input: AssignTenantInput) -> CoreResult<User> {
        if !input.admin_override {
            if let Some(identifier) = input.identifier.as_deref() {
                self.limiter
                    .check_and_count(OP_TENANT_JOIN, identifier)
                    .await?;
            }
        }

        let code = tenant::normalize_code(&input.tenant_code);
        if code.is_empty() {
            return Err(CoreError::Validation {
                message: "tenant code is required".into(),
            });
        }

        // Unknown and deactivated codes fail identically so the endpoint
        // cannot be used to probe which codes exist.
        let target = match self.tenant_repo.get_by_code(&code).await {
            Ok(t) if t.is_active => t,
            Ok(_) | Err(CoreError::NotFound { .. }) => {
                return Err(AuthError::InvalidTenantCode.into());
            }
            Err(e) => return Err(e),
        };

        let user = self.user_repo.get_by_id(input.user_id).await?;
        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }
        if user.is_platform() {
            return Err(CoreError::PermissionDenied {
                reason: "platform accounts cannot join a tenant".into(),
            });
        }

        let updated = self
            .user_repo
            .assign_tenant(user.id, target.id, input.admin_override)
            .await?;

        info!(
            user = %updated.id,
            tenant = %target.id,
            admin_override = input.admin_override,
            "user assigned to tenant"
        );
        Ok(updated)
    }

    /// Rotate a refresh token: atomically consume the old session, verify
    /// the user (and tenant, if any) are still in good standing, and
    /// issue a new pair.
    ///
    /// Claims are re-read from current user state, never copied from the
    /// consumed token, so role and tenant changes propagate on rotation.
    /// Of two concurrent rotations of the same token, exactly one
    /// succeeds; the other observes `TokenRevoked`.
    pub async fn refresh(&self, raw_refresh_token: &str) -> CoreResult<AuthTokens> {
        let token_hash = token::hash_refresh_token(raw_refresh_token);

        let session = self.session_repo.consume(&token_hash).await?;

        if session.is_expired(Utc::now()) {
            return Err(AuthError::TokenExpired.into());
        }

        let user = self.user_repo.get_by_id(session.user_id).await?;
        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }
        self.check_tenant_issuable(&user).await?;

        self.issue_pair(user).await
    }

    /// Issue a fresh token pair for an already-authenticated user, e.g.
    /// right after tenant assignment so the new tenant claim takes
    /// effect without waiting for a refresh. Subject to the same
    /// issuance checks as login.
    pub async fn reissue(&self, user_id: Uuid) -> CoreResult<AuthTokens> {
        let user = self.user_repo.get_by_id(user_id).await?;
        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }
        self.check_tenant_issuable(&user).await?;
        self.issue_pair(user).await
    }

    /// Revoke a refresh token (logout). Idempotent: revoking an unknown
    /// or already-revoked token succeeds quietly.
    pub async fn logout(&self, raw_refresh_token: &str) -> CoreResult<()> {
        let token_hash = token::hash_refresh_token(raw_refresh_token);
        self.session_repo.revoke(&token_hash).await
    }

    /// Revoke all sessions for a user (e.g. on password change).
    pub async fn revoke_all_sessions(&self, user_id: Uuid) -> CoreResult<u64> {
        self.session_repo.revoke_user_sessions(user_id).await
    }

    /// Deny issuance when the user's tenant is missing or deactivated.
    async fn check_tenant_issuable(&self, user: &User) -> CoreResult<Option<Tenant>> {
        let Some(tenant_id) = user.tenant_id else {
            return Ok(None);
        };
        let tenant = match self.tenant_repo.get_by_id(tenant_id).await {
            Ok(t) => t,
            Err(CoreError::NotFound { .. }) => return Err(CoreError::InvalidTenant),
            Err(e) => return Err(e),
        };
        if !tenant.is_active {
            return Err(AuthError::TenantInactive.into());
        }
        Ok(Some(tenant))
    }

    /// Create a refresh session and sign an access token for the current
    /// state of `user`.
    async fn issue_pair(&self, user: User) -> CoreResult<AuthTokens> {
        let raw_refresh = token::generate_refresh_token();
        let token_hash = token::hash_refresh_token(&raw_refresh);
        let refresh_lifetime = self.config.refresh_lifetime();
        let expires_at = Utc::now() + Duration::seconds(refresh_lifetime as i64);

        self.session_repo
            .create(CreateSession {
                user_id: user.id,
                tenant_id: user.tenant_id,
                token_hash,
                expires_at,
            })
            .await?;

        let access_token = token::issue_access_token(&user, &self.config)?;

        Ok(AuthTokens {
            access_token,
            refresh_token: raw_refresh,
            expires_in: self.config.access_lifetime(),
            refresh_expires_in: refresh_lifetime,
            user,
        })
    }
}
