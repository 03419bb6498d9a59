//! Shared building blocks for the MongoHero dashboard.
//!
//! Contains the backend DTOs, the error type, configuration loading and the
//! small list/pagination/size helpers every view relies on.

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod response;
pub mod utils;
