//! Common types and interfaces
//!
//! Value types shared by every component, plus the traits at the seams where
//! collaborators plug in (wallet stores and history sinks).

pub mod types;
pub mod traits;
