//! MongoHero dashboard.
//!
//! [`api`] wraps the REST backend, one client per resource. [`views`] holds
//! the view-models that fetch through those clients and keep the
//! sorted/filtered/paginated state the pages render.

pub mod api;
pub mod client;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use api::Backend;
pub use client::HttpClient;
