//! Door state types and configuration.
//!
//! This module contains the enumerated states exchanged between the door
//! motion engine and the accessory facade, and the typed door configuration.

pub mod config;
pub mod types;
