//! Data models and configuration.

pub mod comparison;
pub mod config;
pub mod tender;
