//! REST API client module for the Roadmate backend.
//!
//! This module provides the `ApiClient` for communicating with the
//! backend's `/api` surface: authentication, user profile and credits,
//! and rest-place search and booking.
//!
//! The API uses JWT bearer authentication: `POST /token/` issues an
//! access/refresh pair, and an expired access token is replaced via
//! `POST /token/refresh/` without involving the caller.

pub mod client;
pub mod error;

pub use client::{ApiClient, AuthEvent};
pub use error::ApiError;
