//! PGConnect - PostgreSQL Connection Manager
//!
//! This library provides the backend for a desktop client that collects
//! PostgreSQL connection parameters, tests them, and establishes pooled
//! sessions.

pub mod commands;
pub mod db;
pub mod form;
pub mod model;

pub use commands::*;
