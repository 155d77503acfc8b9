//! HTTP inbound adapter exposing REST endpoints.

pub mod applications;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;

pub use error::ApiResult;
