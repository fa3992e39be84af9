//! Domain types and invariants for mail composition.

#![forbid(unsafe_code)]

mod address;
mod format;
mod message;
mod transport;

pub use address::{EmailAddress, Recipient};
pub use format::EmailFormat;
pub use message::{
    DEFAULT_CHARSET, DEFAULT_ENCODING, DEFAULT_WORD_WRAP, MailHeader, MessageProfile,
    OutgoingMail, wrap_text,
};
pub use transport::{TransportSettings, parse_dsn};
