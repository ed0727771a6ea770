//! qa-core
//!
//! Domain models, wire events, ports and the in-process broadcast hub for
//! the forum's mutation-and-broadcast pipeline.

pub mod commands;
pub mod error;
pub mod events;
pub mod hub;
pub mod models;
pub mod traits;
pub mod validation;
pub mod votes;

// Re-exporting for easier access in other crates
pub use commands::*;
pub use error::*;
pub use events::*;
pub use hub::{BroadcastHub, Subscription, SubscriptionError, DEFAULT_HUB_CAPACITY};
pub use models::*;
pub use traits::*;
pub use votes::*;
