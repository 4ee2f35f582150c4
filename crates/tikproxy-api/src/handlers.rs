//! Request handlers.

pub mod fetch;
pub mod health;

pub use fetch::*;
pub use health::*;
