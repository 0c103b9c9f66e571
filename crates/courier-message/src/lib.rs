//! # Courier Message
//!
//! The message-side collaborators: HTML template loading and transforms
//! (theme, postscript, QR placeholder), inline-image CID rewriting, vCard
//! encoding, attachment resolution, and the SMTP delivery gateway.
//!
//! Everything here is stateless with respect to the queue: the worker only
//! talks to this crate through the `MessageComposer` and `DeliveryGateway`
//! traits from `courier-core`.

pub mod compose;
pub mod inline;
pub mod smtp;
pub mod template;
pub mod vcard;

pub use compose::MailComposer;
pub use smtp::SmtpGateway;
