use anyhow::{anyhow, Result};
use serde::Deserialize;

/// A payment intent created with the provider; the client secret goes back to
/// the frontend to complete the charge.
#[derive(Debug, Clone)]
pub struct ProviderIntent {
    pub id: String,
    pub client_secret: String,
}

#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, amount_minor: i64, currency: &str) -> Result<ProviderIntent>;
}

/// Stripe payment-intents API over plain HTTP.
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

#[derive(Deserialize)]
struct StripeIntent {
    id: String,
    client_secret: String,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self::with_base_url(secret_key, "https://api.stripe.com")
    }

    pub fn with_base_url(secret_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, amount_minor: i64, currency: &str) -> Result<ProviderIntent> {
        let amount = amount_minor.to_string();
        let params = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("payment_method_types[]", "card"),
        ];

        let resp = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("payment provider rejected intent: {status}: {body}"));
        }

        let intent: StripeIntent = resp.json().await?;
        Ok(ProviderIntent {
            id: intent.id,
            client_secret: intent.client_secret,
        })
    }
}

/// In-process stand-in used by tests; echoes the requested amount and
/// currency in the secret so callers can assert the conversion.
pub struct StubGateway;

impl StubGateway {
    pub fn new() -> Self { Self }
}

impl Default for StubGateway {
    fn default() -> Self { Self::new() }
}

#[async_trait::async_trait]
impl PaymentGateway for StubGateway {
    async fn create_intent(&self, amount_minor: i64, currency: &str) -> Result<ProviderIntent> {
        Ok(ProviderIntent {
            id: format!("pi_stub_{amount_minor}"),
            client_secret: format!("pi_stub_{amount_minor}_secret_{currency}"),
        })
    }
}
