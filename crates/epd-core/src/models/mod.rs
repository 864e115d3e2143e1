//! Data models for utility bills and pipeline configuration.

pub mod bill;
pub mod config;
