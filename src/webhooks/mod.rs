//! Webhook ingress: typed events, payload parsing, and signature verification.

pub mod events;
pub mod parser;
pub mod signature;

pub use events::{CheckState, CheckStatusEvent, Event, PrAction, PrUpdatedEvent, ReviewSubmittedEvent};
pub use parser::{ParseError, parse_webhook};
pub use signature::{compute_signature, format_signature_header, verify_signature};
