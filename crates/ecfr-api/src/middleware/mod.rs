//! # Middleware
//!
//! Request counting for the API. Authentication lives in [`crate::auth`].

pub mod metrics;
