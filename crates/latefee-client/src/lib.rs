//! # Late-Fee API Clients
//!
//! Typed HTTP clients for the two external property-management APIs:
//!
//! - **V2 (reporting)** — aged-receivables and tenant-directory
//!   queries. POST with Basic auth; pages chain through
//!   `next_page_url`, validated against the base host before
//!   following.
//! - **V0 (transactional)** — tenant records and bulk charge
//!   creation. GET with `page[number]`/`page[size]` pagination and a
//!   developer-ID header; tenant queries fan out over bounded
//!   property-ID batches.
//!
//! Both clients share one retry policy (exponential backoff on
//! transport errors and transient statuses) and a per-request timeout.
//! Credentials and endpoints come from the environment via [`config`].

pub mod config;
pub mod error;
mod retry;
pub mod v0;
pub mod v2;

pub use config::{ConfigError, EnvMode, GlConfig, V0Config, V2Config};
pub use error::ClientError;
pub use v0::V0Client;
pub use v2::V2Client;
