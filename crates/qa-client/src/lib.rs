//! # qa-client
//!
//! Client side of the forum pipeline: per-question reconciliation of hub
//! events, vote buttons, form builders and the transports (HTTP commands,
//! WebSocket event relay).

pub mod commands;
pub mod forms;
pub mod reconcile;
pub mod relay;
pub mod vote;

pub use commands::{ClientError, CommandClient, HttpCommandClient};
pub use reconcile::{QuestionView, ViewSession, VIEW_TOPICS};
pub use relay::EventRelay;
pub use vote::VoteHandler;
