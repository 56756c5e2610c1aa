//! REST API client module for the recipe service.
//!
//! This module provides the `ApiClient` for communicating with the
//! backend's `/api/*` endpoints: authentication, ingredient catalog,
//! recipe generation, favorites, ratings and image recognition.
//!
//! Every authenticated request carries a JWT bearer token obtained
//! through the `/api/auth/login` endpoint.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
