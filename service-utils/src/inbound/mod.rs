//! Inbound adapters translating framework requests into toolkit calls.
//!
//! Framework details stay here; [`crate::domain`] never sees actix-web types.

pub mod http;
