use common_auth::AuthContext;
use common_http_errors::ApiError;
use sqlx::PgPool;

/// Confirms the authenticated identity holds the admin role.
///
/// One read against the user store per invocation; there is deliberately no
/// cache, so every admin-gated request pays this lookup.
pub async fn ensure_admin(db: &PgPool, auth: &AuthContext) -> Result<(), ApiError> {
    let role = sqlx::query_scalar::<_, Option<String>>("SELECT role FROM users WHERE email = $1")
        .bind(auth.email())
        .fetch_optional(db)
        .await
        .map_err(ApiError::internal)?;

    match role.flatten().as_deref() {
        Some("admin") => Ok(()),
        _ => Err(ApiError::ForbiddenMissingRole { role: "admin" }),
    }
}

/// Narrow self-service check: the authenticated identity must match the
/// identity named in the route. No database read.
pub fn ensure_self(auth: &AuthContext, email: &str) -> Result<(), ApiError> {
    if auth.email() == email {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use common_auth::Claims;

    fn auth_for(email: &str) -> AuthContext {
        let now = Utc::now();
        AuthContext {
            claims: Claims {
                email: email.to_string(),
                expires_at: now + Duration::hours(1),
                issued_at: Some(now),
            },
            token: String::new(),
        }
    }

    #[test]
    fn self_check_accepts_own_identity() {
        let auth = auth_for("alice@x.com");
        ensure_self(&auth, "alice@x.com").expect("own identity allowed");
    }

    #[test]
    fn self_check_rejects_other_identity() {
        let auth = auth_for("bob@x.com");
        let err = ensure_self(&auth, "alice@x.com").expect_err("mismatch forbidden");
        assert!(matches!(err, ApiError::Forbidden { .. }));
    }
}
