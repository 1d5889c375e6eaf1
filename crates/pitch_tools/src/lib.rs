//! # Pitch Development Tools
//!
//! Command-line tools for development:
//! - Match config validation
//! - Default config generation

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod validate;
