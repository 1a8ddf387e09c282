//! User configuration.
//!
//! There is a single, user-wide configuration file handled by
//! [`GlobalConfig`]. It holds the `[upgrade]` table and the location of the
//! persisted state; see [`global`] for the file format and location rules.

pub mod global;

pub use global::{CONFIG_ENV, GlobalConfig};
