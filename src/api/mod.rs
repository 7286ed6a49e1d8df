//! JSON HTTP endpoints for accounts, profiles and daily rewards.

pub mod accounts;
pub mod error;
pub mod profile;

pub use error::ApiError;
