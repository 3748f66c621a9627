//! Shared foundational types used across the Weft physical-implementation flow.
//!
//! This crate provides the common result type for internal errors and the
//! content hash used to label design checkpoints.

#![warn(missing_docs)]

pub mod hash;
pub mod result;

pub use hash::ContentHash;
pub use result::{InternalError, WeftResult};
