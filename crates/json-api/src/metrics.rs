//! Prometheus text exposition endpoint.

use prometheus::{Encoder, TextEncoder};
use salvo::prelude::*;

use crate::extensions::*;

/// Metrics handler
///
/// Exposes the claim and issuance counters in Prometheus text format.
#[endpoint(tags("metrics"), summary = "Prometheus metrics")]
pub(crate) async fn handler(res: &mut Response) -> Result<(), StatusError> {
    let Some(registry) = rewards_app::metrics::registry() else {
        return Err(StatusError::internal_server_error());
    };

    let mut buffer = Vec::new();

    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .or_500("failed to encode metrics")?;

    res.render(Text::Plain(
        String::from_utf8(buffer)
            .or_500("metrics exposition was not valid utf-8")?,
    ));

    Ok(())
}
