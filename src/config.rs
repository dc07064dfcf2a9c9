use crate::types::{TileError, TileResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sentinel Hub OAuth client credentials.
///
/// Read from the environment (optionally seeded from a `.env` file); never
/// compiled into the binary.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub const CLIENT_ID_VAR: &'static str = "SH_CLIENT_ID";
    pub const CLIENT_SECRET_VAR: &'static str = "SH_CLIENT_SECRET";

    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Load credentials from `SH_CLIENT_ID` / `SH_CLIENT_SECRET`.
    ///
    /// | Env Var            | Required |
    /// |--------------------|----------|
    /// | `SH_CLIENT_ID`     | yes      |
    /// | `SH_CLIENT_SECRET` | yes      |
    pub fn from_env() -> TileResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve credentials through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> TileResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| TileError::Config(format!("{} is not set", key)))
        };

        Ok(Self {
            client_id: fetch(Self::CLIENT_ID_VAR)?,
            client_secret: fetch(Self::CLIENT_SECRET_VAR)?,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Sentinel Hub endpoints and transport settings
#[derive(Debug, Clone)]
pub struct SentinelHubConfig {
    pub token_url: String,
    pub process_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for SentinelHubConfig {
    fn default() -> Self {
        Self {
            token_url: "https://services.sentinel-hub.com/auth/realms/main/protocol/openid-connect/token"
                .to_string(),
            process_url: "https://services.sentinel-hub.com/api/v1/process".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Input and output locations of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub input_csv: PathBuf,
    pub images_dir: PathBuf,
    pub failure_log: PathBuf,
}

impl RunPaths {
    /// Fixed data layout rooted at `base`
    pub fn under(base: impl AsRef<Path>) -> Self {
        let data = base.as_ref().join("data");
        Self {
            input_csv: data.join("raw").join("train(1).csv"),
            images_dir: data.join("images").join("train"),
            failure_log: data.join("logs").join("image_download_failures.csv"),
        }
    }
}
