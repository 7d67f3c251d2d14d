/// Runtime configuration for token issuance and verification.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared HS256 signing secret.
    pub secret: String,
    /// Lifetime of issued tokens in seconds.
    pub token_ttl_seconds: i64,
    /// Allowable clock skew in seconds when validating exp.
    pub leeway_seconds: u32,
}

impl AuthConfig {
    /// Construct config with the fixed one hour token lifetime and a
    /// 30 second leeway.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl_seconds: 3600,
            leeway_seconds: 30,
        }
    }

    /// Adjust the token lifetime.
    pub fn with_ttl(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    /// Adjust the allowed leeway.
    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }
}
