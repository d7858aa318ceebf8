//! Client configuration: endpoint, timeout, user agent.

use std::time::Duration;

/// Production Storage API endpoint (US West data center).
pub const DEFAULT_API_BASE: &str = "https://api.us-west-1.saucelabs.com/v1";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const USER_AGENT: &str = concat!("sauce-storage/", env!("CARGO_PKG_VERSION"));

/// Data center hosting the Storage API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    UsWest1,
    UsEast4,
    EuCentral1,
}

impl Region {
    pub fn as_str(self) -> &'static str {
        match self {
            Region::UsWest1 => "us-west-1",
            Region::UsEast4 => "us-east-4",
            Region::EuCentral1 => "eu-central-1",
        }
    }

    pub fn api_base(self) -> String {
        format!("https://api.{}.saucelabs.com/v1", self.as_str())
    }
}

/// Settings fixed for the lifetime of a client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, without trailing slash
    pub api_base: String,
    /// Applied to every request by the HTTP transport
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn for_region(region: Region) -> Self {
        Self::default().with_api_base(region.api_base())
    }

    /// Override the endpoint (self-hosted or region-specific deployments).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        let api_base: String = api_base.into();
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
