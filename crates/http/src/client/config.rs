//! Client connection settings

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";
pub const DEFAULT_USER_AGENT: &str = concat!("qroom-client/", env!("CARGO_PKG_VERSION"));

/// Settings a [`QroomClient`](super::QroomClient) is built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Backend base URL, e.g. `https://api.qroom.app`
    pub base_url: String,

    /// Request timeout in seconds, 0 for none
    pub timeout_secs: u64,

    pub user_agent: String,

    /// Endpoint that exchanges a refresh token for a new access token
    pub refresh_path: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
        }
    }
}

impl ClientSettings {
    pub const fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }
}
