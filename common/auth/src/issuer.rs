use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

/// Signs time-limited access tokens for a supplied identity.
///
/// The identity is taken at face value; callers are expected to have decided
/// for themselves that it is worth a token.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
}

pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: i64,
    pub token_type: &'static str,
}

#[derive(Serialize)]
struct WireClaims<'a> {
    email: &'a str,
    iat: i64,
    exp: i64,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            ttl: Duration::seconds(config.token_ttl_seconds),
        }
    }

    pub fn issue(&self, email: &str) -> AuthResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + self.ttl;

        let claims = WireClaims {
            email,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )
        .map_err(|err| AuthError::Signing(err.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at,
            expires_in: self.ttl.num_seconds(),
            token_type: "Bearer",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::TokenVerifier;

    fn config() -> AuthConfig {
        AuthConfig::new("test-secret").with_leeway(0)
    }

    #[test]
    fn issued_token_verifies_to_same_identity() {
        let config = config();
        let issuer = TokenIssuer::new(&config);
        let verifier = TokenVerifier::new(&config);

        let issued = issuer.issue("alice@x.com").expect("issue");
        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_in, 3600);

        let claims = verifier.verify(&issued.token).expect("verify");
        assert_eq!(claims.email, "alice@x.com");
        // Wire claims carry whole seconds.
        assert_eq!(claims.expires_at.timestamp(), issued.expires_at.timestamp());
    }

    #[test]
    fn issuing_twice_yields_independent_tokens() {
        let config = config();
        let issuer = TokenIssuer::new(&config);
        let verifier = TokenVerifier::new(&config);

        let first = issuer.issue("bob@x.com").expect("issue");
        let second = issuer.issue("bob@x.com").expect("issue");

        // No single-use constraint: both verify on their own.
        assert_eq!(verifier.verify(&first.token).expect("first").email, "bob@x.com");
        assert_eq!(verifier.verify(&second.token).expect("second").email, "bob@x.com");
    }

    #[test]
    fn expired_token_fails_verification() {
        let config = config().with_ttl(-120);
        let issuer = TokenIssuer::new(&config);
        let verifier = TokenVerifier::new(&config);

        let issued = issuer.issue("late@x.com").expect("issue");
        let err = verifier.verify(&issued.token).expect_err("should be expired");
        assert!(matches!(err, AuthError::Verification(_)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = TokenIssuer::new(&AuthConfig::new("first-secret"));
        let verifier = TokenVerifier::new(&config());

        let issued = issuer.issue("eve@x.com").expect("issue");
        let err = verifier.verify(&issued.token).expect_err("wrong key");
        assert!(matches!(err, AuthError::Verification(_)));
    }
}
