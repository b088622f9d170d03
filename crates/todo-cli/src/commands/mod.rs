//! Command handlers

pub mod config;
pub mod order;
pub mod status;
pub mod todo;
