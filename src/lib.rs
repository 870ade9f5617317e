//! Client for a farm listing marketplace: browse, buy or rent farms,
//! upload and manage listings as a seller, review them as an admin.

pub mod admin;
pub mod api;
pub mod auth;
pub mod browse;
pub mod checkout;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod routes;
pub mod scope;
pub mod seller;
pub mod session;
pub mod validate;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use error::{MarketError, Result};
