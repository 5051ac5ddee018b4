//! HTTP client for the external blind-signature backend.
//!
//! The backend holds the signing keys; this client only submits opaque
//! blinded tokens and stores whatever comes back. Cryptographic
//! validity of the tokens is the backend's concern.

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for connecting to the signer.
#[derive(Debug, Clone)]
pub struct SignerConfig {
    /// Signer server address, e.g. `"http://localhost:2416"`.
    pub addr: String,
}

/// Signed credentials returned by the signer for one claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCredentials {
    pub signed_creds: Vec<String>,
    pub batch_proof: String,
    pub public_key: String,
}

#[derive(Debug, Error)]
pub enum SignerError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The signer rejected the submitted tokens. Not retryable.
    #[error("signer rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The signer returned a non-2xx response or unexpected body.
    #[error("unexpected response from signer: {0}")]
    UnexpectedResponse(String),
}

impl SignerError {
    /// Whether retrying the same request can ever succeed.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

#[automock]
#[async_trait]
pub trait CredentialSigner: Send + Sync {
    /// Submit blinded tokens for signing under the given issuer.
    ///
    /// The returned signed set has the same length as the input.
    async fn sign_credentials(
        &self,
        issuer: &str,
        blinded_creds: &[String],
    ) -> Result<SignedCredentials, SignerError>;
}

/// HTTP signer client.
#[derive(Debug, Clone)]
pub struct HttpCredentialSigner {
    config: SignerConfig,
    http: Client,
}

impl HttpCredentialSigner {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: SignerConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SignRequest<'a> {
    #[serde(rename = "blindedTokens")]
    blinded_tokens: &'a [String],
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedTokens")]
    signed_tokens: Vec<String>,

    #[serde(rename = "batchProof")]
    batch_proof: String,

    #[serde(rename = "publicKey")]
    public_key: String,
}

#[async_trait]
impl CredentialSigner for HttpCredentialSigner {
    async fn sign_credentials(
        &self,
        issuer: &str,
        blinded_creds: &[String],
    ) -> Result<SignedCredentials, SignerError> {
        let url = format!("{}/v1/blindedToken/{issuer}", self.config.addr);

        let response = self
            .http
            .post(&url)
            .json(&SignRequest {
                blinded_tokens: blinded_creds,
            })
            .send()
            .await?;

        let status = response.status();

        if status.is_client_error() {
            let message = response.text().await.unwrap_or_default();

            return Err(SignerError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        if status != StatusCode::OK && status != StatusCode::CREATED {
            let text = response.text().await.unwrap_or_default();

            return Err(SignerError::UnexpectedResponse(format!(
                "sign request failed with status {status}: {text}"
            )));
        }

        let parsed: SignResponse = response.json().await?;

        if parsed.signed_tokens.len() != blinded_creds.len() {
            return Err(SignerError::UnexpectedResponse(format!(
                "expected {} signed tokens, got {}",
                blinded_creds.len(),
                parsed.signed_tokens.len()
            )));
        }

        Ok(SignedCredentials {
            signed_creds: parsed.signed_tokens,
            batch_proof: parsed.batch_proof,
            public_key: parsed.public_key,
        })
    }
}
