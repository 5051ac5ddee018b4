//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, Db},
    dedup::InMemoryClaimDedup,
    domain::{
        claims::{ClaimsService, IssuancePolicy, PgClaimsService},
        promotions::{PgPromotionsService, PromotionsService},
    },
    ledger::{HttpLedgerClient, LedgerConfig},
    signer::{HttpCredentialSigner, SignerConfig},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub promotions: Arc<dyn PromotionsService>,
    pub claims: Arc<dyn ClaimsService>,
}

impl AppContext {
    /// Build application context from a database URL and the addresses
    /// of the signer and ledger backends.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        signer: SignerConfig,
        ledger: LedgerConfig,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool);

        let claims = PgClaimsService::new(
            db.clone(),
            Arc::new(InMemoryClaimDedup::default()),
            Arc::new(HttpLedgerClient::new(ledger)),
            Arc::new(HttpCredentialSigner::new(signer)),
            IssuancePolicy::default(),
        );

        Ok(Self {
            promotions: Arc::new(PgPromotionsService::new(db)),
            claims: Arc::new(claims),
        })
    }
}
