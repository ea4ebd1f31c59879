//! # zrviz Common Library
//!
//! Shared code for the zrviz crates including:
//! - Error and result types
//! - Bootstrap configuration and root folder resolution
//! - Database schema, initialization and entity models
//! - Hundredths-of-a-second time conversions

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
