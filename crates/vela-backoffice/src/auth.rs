//! # Caller Authentication
//!
//! Pass/fail token contract for every back-office operation. The flow is
//! deliberately small: bearer token → `tokens` table lookup (active,
//! unexpired) → role gate.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Auth Decision Flow                               │
//! │                                                                         │
//! │  "Bearer tok-abc…"                                                      │
//! │       │                                                                 │
//! │       ├── not "Bearer <token>" shaped ──────────────► Unauthorized      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TokenRepository::lookup (is_active, expires_at > now)                 │
//! │       │                                                                 │
//! │       ├── no row ───────────────────────────────────► Unauthorized      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AuthContext { role }                                                   │
//! │       │                                                                 │
//! │       └── require_admin_or_agent: Member ───────────► Forbidden         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;

use crate::error::{ServiceError, ServiceResult};
use vela_store::TokenRepository;

/// Role carried by an authenticated token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerRole {
    /// Full back-office access.
    Admin,
    /// Operational access (counter staff tooling).
    Agent,
    /// Read-only customer-facing surfaces; cannot run back-office writes.
    Member,
}

impl CallerRole {
    /// Parses the role string stored in the tokens table.
    ///
    /// Unknown role strings fail closed as [`CallerRole::Member`].
    pub fn from_db(role: &str) -> Self {
        match role {
            "admin" => CallerRole::Admin,
            "agent" => CallerRole::Agent,
            _ => CallerRole::Member,
        }
    }
}

/// The authenticated caller, threaded through every service call.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub role: CallerRole,
}

impl AuthContext {
    /// Constructs a context directly. Intended for tests and trusted
    /// in-process callers; external input goes through [`authenticate`].
    pub fn with_role(role: CallerRole) -> Self {
        AuthContext { role }
    }
}

/// Authenticates a raw `Authorization` header value.
pub async fn authenticate(
    tokens: &TokenRepository,
    authorization: &str,
) -> ServiceResult<AuthContext> {
    let token = authorization
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ServiceError::Unauthorized("Invalid authorization header format".to_string())
        })?;

    let record = tokens
        .lookup(token)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("Invalid or expired token".to_string()))?;

    let role = CallerRole::from_db(&record.role);
    debug!(?role, "Caller authenticated");

    Ok(AuthContext { role })
}

/// Gate for every back-office operation: admin and agent pass, member fails.
pub fn require_admin_or_agent(ctx: &AuthContext) -> ServiceResult<()> {
    match ctx.role {
        CallerRole::Admin | CallerRole::Agent => Ok(()),
        CallerRole::Member => Err(ServiceError::Forbidden),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use vela_store::{DbConfig, Store, TokenRecord};

    #[test]
    fn test_role_parsing_fails_closed() {
        assert_eq!(CallerRole::from_db("admin"), CallerRole::Admin);
        assert_eq!(CallerRole::from_db("agent"), CallerRole::Agent);
        assert_eq!(CallerRole::from_db("member"), CallerRole::Member);
        assert_eq!(CallerRole::from_db("superuser"), CallerRole::Member);
    }

    #[test]
    fn test_member_is_forbidden() {
        let ctx = AuthContext::with_role(CallerRole::Member);
        assert!(matches!(
            require_admin_or_agent(&ctx),
            Err(ServiceError::Forbidden)
        ));

        let ctx = AuthContext::with_role(CallerRole::Agent);
        assert!(require_admin_or_agent(&ctx).is_ok());
    }

    #[tokio::test]
    async fn test_authenticate_against_token_table() {
        let store = Store::new(DbConfig::in_memory()).await.unwrap();
        let repo = store.tokens();

        repo.insert(&TokenRecord {
            access_token: "tok-live".to_string(),
            role: "agent".to_string(),
            is_active: true,
            expires_at: Utc::now() + Duration::hours(1),
        })
        .await
        .unwrap();

        let ctx = authenticate(&repo, "Bearer tok-live").await.unwrap();
        assert_eq!(ctx.role, CallerRole::Agent);

        let err = authenticate(&repo, "Bearer tok-unknown").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        let err = authenticate(&repo, "tok-live").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }
}
