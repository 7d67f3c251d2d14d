use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Application-focused representation of a verified identity claim.
#[derive(Debug, Clone, Serialize)]
pub struct Claims {
    pub email: String,
    pub expires_at: DateTime<Utc>,
    pub issued_at: Option<DateTime<Utc>>,
}

impl Claims {
    /// True once the validity window has passed.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClaimsRepr {
    pub email: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

impl TryFrom<ClaimsRepr> for Claims {
    type Error = AuthError;

    fn try_from(value: ClaimsRepr) -> AuthResult<Self> {
        if value.email.is_empty() {
            return Err(AuthError::InvalidClaim("email", value.email));
        }

        let expires_at = Utc
            .timestamp_opt(value.exp, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidClaim("exp", value.exp.to_string()))?;

        let issued_at = match value.iat {
            Some(iat) => Some(
                Utc.timestamp_opt(iat, 0)
                    .single()
                    .ok_or_else(|| AuthError::InvalidClaim("iat", iat.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            email: value.email,
            expires_at,
            issued_at,
        })
    }
}

impl TryFrom<serde_json::Value> for Claims {
    type Error = AuthError;

    fn try_from(value: serde_json::Value) -> AuthResult<Self> {
        let repr: ClaimsRepr = serde_json::from_value(value)
            .map_err(|err| AuthError::InvalidJson(err.to_string()))?;
        Claims::try_from(repr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn claims_from_json_round_trip() {
        let now = Utc::now().timestamp();
        let claims = Claims::try_from(json!({
            "email": "alice@x.com",
            "iat": now,
            "exp": now + 3600,
        }))
        .expect("claims decode");

        assert_eq!(claims.email, "alice@x.com");
        assert_eq!(claims.expires_at.timestamp(), now + 3600);
        assert_eq!(claims.issued_at.map(|t| t.timestamp()), Some(now));
        assert!(!claims.is_expired());
    }

    #[test]
    fn claims_reject_empty_email() {
        let err = Claims::try_from(json!({"email": "", "exp": 1_700_000_000}))
            .expect_err("empty email should fail");
        assert!(matches!(err, AuthError::InvalidClaim("email", _)));
    }

    #[test]
    fn claims_reject_missing_exp() {
        let err = Claims::try_from(json!({"email": "alice@x.com"}))
            .expect_err("missing exp should fail");
        assert!(matches!(err, AuthError::InvalidJson(_)));
    }
}
