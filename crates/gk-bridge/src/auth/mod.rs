//! Client authentication
//!
//! `AuthMiddleware` runs the per-connection credential collection state
//! machine; `checkers` holds the backends it can ask for a decision.

pub mod checkers;
mod middleware;

pub use middleware::{AuthMiddleware, Phase};
