use std::env;

use anyhow::Result;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    /// Requester for CLI commands when `--user` isn't given
    pub default_user: Option<String>,
    /// Address the web server binds to (THRIFTFEED_BIND)
    #[cfg(feature = "web")]
    pub bind: String,
    /// Port the web server listens on (THRIFTFEED_PORT)
    #[cfg(feature = "web")]
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every setting has a default except the default user.
    pub fn load() -> Result<Self> {
        #[cfg(feature = "web")]
        let port = match env::var("THRIFTFEED_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("THRIFTFEED_PORT must be a port number: {e}"))?,
            Err(_) => 3000,
        };

        Ok(Self {
            db_path: env::var("THRIFTFEED_DB_PATH")
                .unwrap_or_else(|_| "./thriftfeed.db".to_string()),
            default_user: env::var("THRIFTFEED_USER").ok().filter(|u| !u.is_empty()),
            #[cfg(feature = "web")]
            bind: env::var("THRIFTFEED_BIND").unwrap_or_else(|_| "127.0.0.1".to_string()),
            #[cfg(feature = "web")]
            port,
        })
    }

    /// Resolve the requesting user: the explicit flag wins, then THRIFTFEED_USER.
    /// Call this before any command that ranks posts for someone.
    pub fn require_user(&self, flag: Option<String>) -> Result<String> {
        match flag.or_else(|| self.default_user.clone()) {
            Some(user) if !user.trim().is_empty() => Ok(user.trim().to_string()),
            _ => anyhow::bail!(
                "No user given. Pass --user <id> or set THRIFTFEED_USER in your .env file."
            ),
        }
    }
}
