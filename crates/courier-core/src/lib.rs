//! # Courier Core
//! Shared configuration, error type, and the collaborator interfaces the
//! delivery worker consumes.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::CourierConfig;
pub use error::{CourierError, Result};
pub use traits::{DeliveryGateway, MessageComposer};
pub use types::{ComposeRequest, ComposedEmail, FileAttachment, InlineImage};
