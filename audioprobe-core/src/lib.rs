//! # Audioprobe Core
//!
//! Core types and utilities shared by the audioprobe metadata scanners.
//!
//! This crate provides the building blocks used across all audioprobe
//! components:
//! - Error handling types
//! - Defensive stream position/length helpers

pub mod error;
pub mod io;

pub use error::{Error, Result};
pub use io::{position_or_zero, read_up_to, stream_len};
