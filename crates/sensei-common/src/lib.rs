//! # Sensei Common
//!
//! Shared types, traits, and utilities used across Sensei components.
//!
//! ## Modules
//! - `types` - Core data structures (Difficulty, StatsSnapshot, etc.)
//! - `error` - Common error types
//! - `constants` - Shared configuration constants

pub mod constants;
pub mod error;
pub mod types;

pub use error::SenseiError;
pub use types::*;
