//! Mimic Sphere Shared Library
//!
//! Wire types exchanged between the backend and its clients.

pub mod types;

pub use types::*;
