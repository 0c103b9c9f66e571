//! Collaborator interfaces between the queue worker and the message side.
//!
//! The worker only ever sees these two traits; template handling and the
//! SMTP handshake live behind them and hold no queue state.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ComposeRequest, ComposedEmail};

/// Builds a ready-to-send message for one recipient.
///
/// Must be pure with respect to the worker's state: no effect on the queue,
/// and the same request always yields an equivalent message (modulo the
/// configured randomized postscript).
pub trait MessageComposer: Send + Sync {
    fn compose(&self, request: &ComposeRequest) -> Result<ComposedEmail>;
}

/// Hands a composed message to the transport.
///
/// Failures surface as a textual description only; the worker does not
/// distinguish error subtypes beyond success/failure. Any network timeout
/// is owned by the gateway, not the worker.
#[async_trait]
pub trait DeliveryGateway: Send + Sync {
    async fn deliver(&self, email: &ComposedEmail) -> std::result::Result<(), String>;
}
