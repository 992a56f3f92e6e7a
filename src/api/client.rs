//! API client for communicating with the Roadmate REST backend.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! API requests. Every request goes through a single dispatch path that
//! attaches the stored access token and, on a 401, refreshes it from the
//! stored refresh token and retries the request exactly once.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::auth::{CredentialStore, SessionStore, SessionTokens};
use crate::config::Config;
use crate::models::{
    Amenity, Booking, BookingRequest, CancelResponse, CreditsAdded, CreditsBalance, PlaceFilter,
    ProfileUpdate, RegisterRequest, RegisterResponse, RestPlace, UserProfile,
};

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct TokenPairResponse {
    access: String,
    refresh: String,
}

#[derive(Debug, Deserialize)]
struct TokenRefreshResponse {
    access: String,
}

/// Out-of-band notifications from the client to the embedding UI.
///
/// The client never performs navigation itself; when the session cannot
/// be recovered it emits an event and leaves routing to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// Both tokens were wiped; the UI should navigate to the login view.
    RedirectToLogin,
}

/// Immutable description of one outbound request.
///
/// Retry state is not stored here - the dispatch loop threads an explicit
/// flag instead, so a descriptor can never be re-retried by accident.
struct ApiRequest<'a> {
    method: Method,
    path: &'a str,
    query: &'a [(&'a str, String)],
    body: Option<&'a serde_json::Value>,
}

/// API client for the Roadmate backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
    events: Option<mpsc::UnboundedSender<AuthEvent>>,
}

impl ApiClient {
    /// Create a new API client against the configured base URL
    pub fn new(config: &Config, session: Arc<SessionStore>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            events: None,
        })
    }

    /// Subscribe to auth lifecycle events.
    ///
    /// Replaces any previous subscription; the client holds only the
    /// sending half and drops events when nobody is listening.
    pub fn auth_events(&mut self) -> mpsc::UnboundedReceiver<AuthEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    /// Shared handle to the session store backing this client
    pub fn session(&self) -> Arc<SessionStore> {
        Arc::clone(&self.session)
    }

    // ===== Dispatch =====

    /// Build and send a single request, attaching the current access
    /// token if one is stored. No retry logic lives here.
    async fn send_once(&self, request: &ApiRequest<'_>) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header(header::CONTENT_TYPE, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(request.query);
        }
        if let Some(token) = self.session.access().await {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, url = %url, "Dispatching API request");
        let response = builder.send().await.map_err(ApiError::Network)?;
        Ok(response)
    }

    /// Dispatch a request with single-shot token recovery.
    ///
    /// On a 401 the stored refresh token is exchanged for a new access
    /// token and the request is re-dispatched once. A second 401, or a
    /// 401 with no refresh token on hand, is fatal: the session is wiped,
    /// `AuthEvent::RedirectToLogin` is emitted, and the error propagates.
    async fn execute(&self, request: ApiRequest<'_>) -> Result<reqwest::Response> {
        let mut retried = false;
        loop {
            let response = self.send_once(&request).await?;

            if response.status() == StatusCode::UNAUTHORIZED && !retried {
                warn!(path = request.path, "Request rejected with 401, attempting token refresh");

                let Some(refresh) = self.session.refresh_token().await else {
                    // Nothing to recover with: surface the original 401.
                    self.expire_session().await;
                    return Err(Self::response_error(response).await.into());
                };

                match self.refresh_access_token(&refresh).await {
                    Ok(()) => {
                        retried = true;
                        continue;
                    }
                    Err(err) => {
                        warn!(error = %err, "Token refresh failed, clearing session");
                        self.expire_session().await;
                        return Err(err);
                    }
                }
            }

            if response.status().is_success() {
                return Ok(response);
            }
            return Err(Self::response_error(response).await.into());
        }
    }

    /// Mint a new access token from the refresh token.
    ///
    /// This call goes straight to the network layer instead of through
    /// `execute`, so a 401 from the refresh endpoint itself can never
    /// trigger another refresh.
    async fn refresh_access_token(&self, refresh: &str) -> Result<()> {
        let url = format!("{}/token/refresh/", self.base_url);
        let response = self
            .http
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&json!({ "refresh": refresh }))
            .send()
            .await
            .map_err(ApiError::Network)?;

        if !response.status().is_success() {
            return Err(Self::response_error(response).await.into());
        }

        let refreshed: TokenRefreshResponse = response
            .json()
            .await
            .context("Failed to parse token refresh response")?;

        // Only the access token is replaced; the refresh token stays.
        self.session.set_access(refreshed.access).await?;
        debug!("Access token refreshed");
        Ok(())
    }

    /// Wipe the session and tell the UI to return to the login view
    async fn expire_session(&self) {
        if let Err(err) = self.session.clear().await {
            warn!(error = %err, "Failed to clear session storage");
        }
        if let Some(events) = &self.events {
            let _ = events.send(AuthEvent::RedirectToLogin);
        }
    }

    async fn response_error(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        ApiError::from_status(status, &body)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_with_query(path, &[]).await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .execute(ApiRequest {
                method: Method::GET,
                path,
                query,
                body: None,
            })
            .await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", path))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body).context("Failed to serialize request body")?;
        let response = self
            .execute(ApiRequest {
                method: Method::POST,
                path,
                query: &[],
                body: Some(&body),
            })
            .await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", path))
    }

    async fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body).context("Failed to serialize request body")?;
        let response = self
            .execute(ApiRequest {
                method: Method::PATCH,
                path,
                query: &[],
                body: Some(&body),
            })
            .await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", path))
    }

    // ===== Authentication =====

    /// Log in with username and password.
    ///
    /// Stores the issued token pair, then fetches and returns the user's
    /// profile.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile> {
        let pair: TokenPairResponse = self
            .post(
                "/token/",
                &json!({ "username": username, "password": password }),
            )
            .await?;

        self.session
            .set(SessionTokens::new(
                pair.access,
                pair.refresh,
                username.to_string(),
            ))
            .await?;
        info!(username = username, "Logged in");

        self.profile().await
    }

    /// Log in and remember the password in the OS keychain for
    /// [`Self::login_remembered`].
    pub async fn login_and_remember(&self, username: &str, password: &str) -> Result<UserProfile> {
        let profile = self.login(username, password).await?;
        if let Err(err) = CredentialStore::store(username, password) {
            // Login succeeded; a keychain problem should not undo it
            warn!(error = %err, "Failed to store credentials in keychain");
        }
        Ok(profile)
    }

    /// Log in using a password previously stored in the OS keychain
    pub async fn login_remembered(&self, username: &str) -> Result<UserProfile> {
        let password = CredentialStore::get_password(username)?;
        self.login(username, &password).await
    }

    /// Register a new account, then log in with the new credentials
    pub async fn register(&self, request: &RegisterRequest) -> Result<UserProfile> {
        let created: RegisterResponse = self.post("/users/register/", request).await?;
        debug!(message = %created.message, "Registration accepted");
        self.login(&request.username, &request.password).await
    }

    /// Drop the session. Purely local: the backend keeps no session state.
    pub async fn logout(&self) -> Result<()> {
        self.session.clear().await?;
        info!("Logged out");
        Ok(())
    }

    /// Drop the session and remove any remembered password for its user
    pub async fn logout_and_forget(&self) -> Result<()> {
        if let Some(username) = self.session.username().await {
            if CredentialStore::has_credentials(&username) {
                if let Err(err) = CredentialStore::forget(&username) {
                    warn!(error = %err, "Failed to remove remembered credentials");
                }
            }
        }
        self.logout().await
    }

    /// Validate a persisted session against the backend.
    ///
    /// Returns `Ok(None)` when no session is stored. When the backend
    /// rejects the session (even after a refresh attempt), the tokens are
    /// wiped and the error propagates.
    pub async fn check_auth(&self) -> Result<Option<UserProfile>> {
        if self.session.access().await.is_none() {
            debug!("No stored session to validate");
            return Ok(None);
        }
        match self.profile().await {
            Ok(profile) => Ok(Some(profile)),
            Err(err) => {
                if let Err(clear_err) = self.session.clear().await {
                    warn!(error = %clear_err, "Failed to clear session storage");
                }
                Err(err)
            }
        }
    }

    // ===== User endpoints =====

    /// Fetch the authenticated user's profile
    pub async fn profile(&self) -> Result<UserProfile> {
        self.get("/users/profile/").await
    }

    /// Update profile fields; unset fields are left untouched
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        self.patch("/users/profile/", update).await
    }

    /// Fetch the current credit balance
    pub async fn credits(&self) -> Result<CreditsBalance> {
        self.get("/users/credits/").await
    }

    /// Top up the credit balance. The backend rejects non-positive amounts.
    pub async fn add_credits(&self, amount: f64) -> Result<CreditsAdded> {
        self.post("/users/credits/", &json!({ "amount": amount }))
            .await
    }

    // ===== Rest place endpoints =====

    /// Search rest places with optional filters
    pub async fn places(&self, filter: &PlaceFilter) -> Result<Vec<RestPlace>> {
        self.get_with_query("/rest-places/places/", &filter.query_params())
            .await
    }

    /// Fetch a single rest place by id
    pub async fn place(&self, id: i64) -> Result<RestPlace> {
        self.get(&format!("/rest-places/places/{}/", id)).await
    }

    /// Fetch rest places within `radius_km` of a coordinate, nearest first
    pub async fn nearby_places(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<RestPlace>> {
        let query = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("radius", radius_km.to_string()),
        ];
        self.get_with_query("/rest-places/places/nearby/", &query)
            .await
    }

    /// Fetch the place-type code to display-name mapping
    pub async fn place_types(&self) -> Result<HashMap<String, String>> {
        self.get("/rest-places/places/types/").await
    }

    /// Fetch all known amenities
    pub async fn amenities(&self) -> Result<Vec<Amenity>> {
        self.get("/rest-places/amenities/").await
    }

    /// Book a stay at a rest place
    pub async fn book_place(&self, place_id: i64, booking: &BookingRequest) -> Result<Booking> {
        self.post(&format!("/rest-places/places/{}/book/", place_id), booking)
            .await
    }

    /// Fetch the authenticated user's bookings
    pub async fn bookings(&self) -> Result<Vec<Booking>> {
        self.get("/rest-places/bookings/").await
    }

    /// Cancel a pending or confirmed booking
    pub async fn cancel_booking(&self, booking_id: i64) -> Result<CancelResponse> {
        self.post(
            &format!("/rest-places/bookings/{}/cancel/", booking_id),
            &json!({}),
        )
        .await
    }
}
