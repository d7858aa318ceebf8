//! Basic Auth credentials for the Storage API.
//!
//! Username + access key, sent on every request. Nothing is persisted;
//! embedding applications decide where credentials come from.

use std::fmt;

use crate::error::StorageError;

/// Environment variable read by [`Credentials::from_env`] for the username.
pub const USERNAME_ENV: &str = "SAUCE_USERNAME";
/// Environment variable read by [`Credentials::from_env`] for the access key.
pub const ACCESS_KEY_ENV: &str = "SAUCE_ACCESS_KEY";

/// Username / access key pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    access_key: String,
}

impl Credentials {
    /// Leading and trailing whitespace is trimmed from both values, the
    /// access key included. Both must be non-empty after trimming.
    pub fn new(username: impl Into<String>, access_key: impl Into<String>) -> Result<Self, StorageError> {
        let username: String = username.into();
        let access_key: String = access_key.into();
        let username = username.trim().to_string();
        let access_key = access_key.trim().to_string();

        if username.is_empty() {
            return Err(StorageError::Configuration("username must not be empty".into()));
        }
        if access_key.is_empty() {
            return Err(StorageError::Configuration("access key must not be empty".into()));
        }

        Ok(Self { username, access_key })
    }

    /// Read credentials from `SAUCE_USERNAME` / `SAUCE_ACCESS_KEY`.
    pub fn from_env() -> Result<Self, StorageError> {
        let username = read_env(USERNAME_ENV)?;
        let access_key = read_env(ACCESS_KEY_ENV)?;
        Self::new(username, access_key)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }
}

// Access key stays out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

fn read_env(name: &str) -> Result<String, StorageError> {
    std::env::var(name)
        .map_err(|_| StorageError::Configuration(format!("{} is not set", name)))
}
