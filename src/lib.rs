//! Core library for Roadmate, a travel companion for highway trips.
//!
//! This crate holds everything a Roadmate front end needs to talk to the
//! backend: an authenticated API client with transparent token refresh,
//! durable session storage, typed models for the REST endpoints, and
//! client configuration. Rendering, routing, and voice features live in
//! the embedding application, not here.
//!
//! The backend issues a short-lived access token and a longer-lived
//! refresh token (`POST /token/`). The [`api::ApiClient`] attaches the
//! access token to every request and, on a 401, mints a new access token
//! from the stored refresh token and retries the request exactly once.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, AuthEvent};
pub use auth::{CredentialStore, SessionStore, SessionTokens};
pub use config::Config;
