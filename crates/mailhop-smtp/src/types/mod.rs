//! Core SMTP types.

mod envelope;
mod reply;

pub use envelope::Envelope;
pub use reply::{Reply, ReplyCode};
