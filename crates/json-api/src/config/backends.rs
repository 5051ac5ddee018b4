//! External Backends Config

use clap::Args;

/// Addresses of the blind-signature and wallet-ledger backends.
#[derive(Debug, Args)]
pub struct BackendsConfig {
    /// Blind-signature signer address
    #[arg(long, env = "CHALLENGE_BYPASS_SERVER", default_value = "http://localhost:2416")]
    pub signer_addr: String,

    /// Wallet ledger address
    #[arg(long, env = "LEDGER_SERVER", default_value = "http://localhost:3001")]
    pub ledger_addr: String,
}
