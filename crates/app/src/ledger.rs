//! HTTP client for the wallet/ledger lookup service.

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Configuration for connecting to the ledger service.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Ledger server address, e.g. `"http://localhost:3001"`.
    pub addr: String,
}

/// Wallet identity resolved from a payment ID.
///
/// Treated as an immutable value object; this service never mutates
/// wallet state, it only records the identity a claim was made under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletInfo {
    pub payment_id: Uuid,
    pub provider: String,
    pub provider_id: String,
    pub public_key: String,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The ledger has no wallet for the given payment ID.
    #[error("wallet not found")]
    NotFound,

    /// The ledger returned a non-2xx response or unexpected body.
    #[error("unexpected response from ledger: {0}")]
    UnexpectedResponse(String),
}

#[automock]
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Resolve a payment ID to its wallet identity.
    async fn get_wallet(&self, payment_id: Uuid) -> Result<WalletInfo, LedgerError>;
}

/// HTTP ledger client.
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    config: LedgerConfig,
    http: Client,
}

impl HttpLedgerClient {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WalletResponse {
    #[serde(rename = "paymentId")]
    payment_id: Uuid,

    provider: String,

    #[serde(rename = "providerId")]
    provider_id: String,

    #[serde(rename = "publicKey")]
    public_key: String,
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn get_wallet(&self, payment_id: Uuid) -> Result<WalletInfo, LedgerError> {
        let url = format!("{}/v2/wallet/{payment_id}", self.config.addr);

        let response = self.http.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(LedgerError::NotFound);
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(LedgerError::UnexpectedResponse(format!(
                "wallet lookup failed with status {status}: {text}"
            )));
        }

        let parsed: WalletResponse = response.json().await?;

        Ok(WalletInfo {
            payment_id: parsed.payment_id,
            provider: parsed.provider,
            provider_id: parsed.provider_id,
            public_key: parsed.public_key,
        })
    }
}
