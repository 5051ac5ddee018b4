//! Shared test infrastructure.

mod stubs;

pub(crate) use context::TestContext;
pub(crate) use db::TestDb;
pub(crate) use stubs::{PassThroughDedup, StubLedger, StubSigner, UnavailableDedup};
