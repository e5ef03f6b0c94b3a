//! gk-protocol: OpenVPN management-interface line protocol
//!
//! This crate defines the text protocol spoken over the management socket
//! between the VPN daemon and Gatekeeper: the inbound client lifecycle
//! events we recognize, the outbound commands we write, and the tokio
//! codec that frames both as newline-terminated lines.

pub mod codec;
pub mod command;
pub mod error;
pub mod event;
pub mod ids;

pub use codec::{ManagementCodec, DEFAULT_MAX_LINE_LENGTH};
pub use command::{Command, DenyReason};
pub use error::ProtocolError;
pub use event::{LinePatterns, StateNotification, PASSWORD_PROMPT};
pub use ids::{ClientId, ClientKey, KeyId};
