//! Shared foundational types used across the MiniPlacement workspace.
//!
//! This crate provides the dense ID-indexed [`Arena`] with its [`define_id!`]
//! helper, content hashing for reproducibility checks, and the common
//! internal error type.

#![warn(missing_docs)]

pub mod arena;
pub mod hash;
pub mod result;

pub use arena::{Arena, ArenaId};
pub use hash::ContentHash;
pub use result::InternalError;
