//! Garage Door Common Library
//!
//! This crate provides the shared types, GPIO primitives and configuration
//! loading utilities used by the garage door workspace crates.
//!
//! # Module Structure
//!
//! - [`door`] - Door/target state enums and the door configuration schema
//! - [`gpio`] - Pin primitives, the `GpioBackend` trait and GPIO errors
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Workspace-wide defaults and limits
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use garage_common::prelude::*;
//!
//! let config = DoorConfig::default();
//! assert_eq!(config.auto_closing_mode, AutoClosingMode::None);
//! ```

pub mod config;
pub mod consts;
pub mod door;
pub mod gpio;
pub mod prelude;
