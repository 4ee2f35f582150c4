//! On-disk artifact store for tikproxy.
//!
//! Owns the storage root layout: where raw downloads and encoded outputs
//! live, how they are cleaned up, and how delayed expiry works. The HTTP
//! layer serves the same root statically.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{ArtifactKind, ArtifactStore};
