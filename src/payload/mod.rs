//! Decoded payload classification
//!
//! - [`vcard`]: contact card parsing
//! - [`router`]: contact editor vs. raw result dispatch

pub mod router;
pub mod vcard;

pub use router::{Action, PayloadRouter, RouterState};
pub use vcard::{VCARD_MARKER, contains_vcard, parse_vcard};
