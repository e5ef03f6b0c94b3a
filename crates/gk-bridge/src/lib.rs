//! gk-bridge: OpenVPN management-interface authentication bridge
//!
//! Gatekeeper connects to the management socket of an OpenVPN server
//! running with `--management-client-auth`, collects each client's
//! credentials from the `>CLIENT:` notification stream, asks a credential
//! checker for a decision and answers with `client-auth-nt` or
//! `client-deny`.

pub mod auth;
pub mod management;
pub mod state;

pub use auth::{AuthMiddleware, Phase};
pub use management::{ManagementClient, ManagementSession, ManagementWriter};
pub use state::StateTracker;
