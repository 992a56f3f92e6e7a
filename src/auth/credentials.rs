use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "roadmate";

/// Secure storage for remember-me passwords in the OS keychain.
///
/// Only the login password lives here; session tokens belong to
/// [`super::SessionStore`]. The token-refresh path never reads this.
pub struct CredentialStore;

impl CredentialStore {
    fn entry(username: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, username).context("Failed to create keyring entry")
    }

    /// Remember a password for a username
    pub fn store(username: &str, password: &str) -> Result<()> {
        Self::entry(username)?
            .set_password(password)
            .context("Failed to store password in keychain")
    }

    /// Retrieve the remembered password for a username
    pub fn get_password(username: &str) -> Result<String> {
        Self::entry(username)?
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    /// Remove the remembered password for a username
    pub fn forget(username: &str) -> Result<()> {
        Self::entry(username)?
            .delete_credential()
            .context("Failed to delete credential from keychain")
    }

    /// Whether a password is remembered for a username
    pub fn has_credentials(username: &str) -> bool {
        Self::entry(username)
            .map(|entry| entry.get_password().is_ok())
            .unwrap_or(false)
    }
}
