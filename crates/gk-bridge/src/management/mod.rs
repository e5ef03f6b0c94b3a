//! Management-interface connection handling
//!
//! `ManagementClient` dials the daemon and reconnects with backoff;
//! `ManagementSession` runs one connection, feeding lines to the
//! middlewares; `ManagementWriter` is the shared write half.

mod client;
mod reconnect;
mod session;
mod writer;

pub use client::ManagementClient;
pub use reconnect::ExponentialBackoff;
pub use session::ManagementSession;
pub use writer::ManagementWriter;
