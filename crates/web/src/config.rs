//! Process configuration, read once at startup.
//!
//! Required values have no fallback: an unset signing secret or upstream
//! credential is a startup error, not a silent default.

use std::net::SocketAddr;
use std::path::PathBuf;

use pvegate_common::{Error, Result};

use crate::proxmox::ProxmoxConfig;

/// Default upstream request timeout in seconds.
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Gateway configuration
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Listen address, e.g. 127.0.0.1:8080
    pub addr: SocketAddr,
    /// Path to the record state database
    pub db_path: PathBuf,
    /// HS256 secret used to verify inbound `token` cookies
    pub jwt_secret: String,
    /// Upstream Proxmox API connection settings
    pub proxmox: ProxmoxConfig,
}

impl GatewayConfig {
    /// Read configuration from the environment.
    ///
    /// Required: `PVEGATE_JWT_SECRET`, `PROXMOX_API_URL`, `PROXMOX_TOKEN_ID`,
    /// `PROXMOX_TOKEN_SECRET`. Optional: `PVEGATE_ADDR`, `PVEGATE_DB_PATH`,
    /// `PVEGATE_UPSTREAM_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let addr: SocketAddr = std::env::var("PVEGATE_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| Error::InvalidConfig(format!("PVEGATE_ADDR: {e}")))?;

        let db_path = std::env::var("PVEGATE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| pvegate_common::default_db_path());

        let jwt_secret = require_env("PVEGATE_JWT_SECRET")?;

        let timeout_secs = std::env::var("PVEGATE_UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS);

        let proxmox = ProxmoxConfig {
            api_url: require_env("PROXMOX_API_URL")?,
            token_id: require_env("PROXMOX_TOKEN_ID")?,
            token_secret: require_env("PROXMOX_TOKEN_SECRET")?,
            timeout_secs,
        };

        Ok(Self {
            addr,
            db_path,
            jwt_secret,
            proxmox,
        })
    }
}

fn require_env(key: &'static str) -> Result<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::InvalidConfig(format!("{key} is required"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_env_rejects_unset_and_blank() {
        assert!(matches!(
            require_env("PVEGATE_TEST_UNSET"),
            Err(Error::InvalidConfig(_))
        ));

        std::env::set_var("PVEGATE_TEST_BLANK", "   ");
        assert!(matches!(
            require_env("PVEGATE_TEST_BLANK"),
            Err(Error::InvalidConfig(_))
        ));

        std::env::set_var("PVEGATE_TEST_SET", "value");
        assert_eq!(require_env("PVEGATE_TEST_SET").unwrap(), "value");
    }
}
