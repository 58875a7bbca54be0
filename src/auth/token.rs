//! Token models: the shared client token, per-session user records, and raw grant payloads.

pub mod client;
pub mod payload;
pub mod record;
pub mod secret;
