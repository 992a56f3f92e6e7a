//! Authentication module for managing sessions and credentials.
//!
//! This module provides:
//! - `SessionStore`: durable storage for the access/refresh token pair
//! - `CredentialStore`: secure OS-level credential storage via keyring
//!
//! Sessions are persisted to disk so an authenticated session survives a
//! restart. No expiry is tracked locally: the backend's 401 response is
//! the only authority on whether the access token is still valid.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{SessionStore, SessionTokens};
