//! qa-services
//!
//! Server-side command handling for the forum: every accepted write is
//! persisted, linked, reloaded and published on the injected hub.

pub mod mutation;

pub use mutation::MutationService;
pub use qa_core::votes::VoteOutcome;
