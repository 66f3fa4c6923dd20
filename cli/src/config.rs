//! Command-line configuration.
//!
//! Priority (highest first): CLI arguments, environment variables (via
//! clap's `env` attribute), compiled defaults.

use std::time::Duration;

use posts_core::{ReqwestTransport, TransportError, DEFAULT_BASE_URL};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("base URL must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),

    #[error("timeout must be at least one second")]
    ZeroTimeout,

    #[error("failed to build HTTP client: {0}")]
    Transport(#[from] TransportError),
}

#[derive(clap::Parser, Debug)]
#[command(version, about = "Load posts from a REST endpoint and print them")]
pub struct CliArgs {
    /// Base URL of the posts API; `/posts/` is appended.
    #[arg(long, env = "POSTS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Overall request timeout. Without it the HTTP client's default applies.
    #[arg(long, env = "POSTS_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, env = "POSTS_LOG", default_value = "warn")]
    pub log_level: String,
}

impl CliArgs {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn transport(&self) -> Result<ReqwestTransport, ConfigError> {
        match self.timeout_secs {
            Some(secs) => Ok(ReqwestTransport::with_timeout(Duration::from_secs(secs))?),
            None => Ok(ReqwestTransport::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_point_at_public_endpoint() {
        let args = CliArgs::try_parse_from(["posts"]).unwrap();
        assert_eq!(args.base_url, DEFAULT_BASE_URL);
        assert_eq!(args.timeout_secs, None);
        assert_eq!(args.log_level, "warn");
        assert!(args.validate().is_ok());
    }

    #[test]
    fn flags_override_defaults() {
        let args = CliArgs::try_parse_from([
            "posts",
            "--base-url",
            "http://127.0.0.1:3000",
            "--timeout-secs",
            "5",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.base_url, "http://127.0.0.1:3000");
        assert_eq!(args.timeout_secs, Some(5));
        assert!(args.transport().is_ok());
    }

    #[test]
    fn rejects_non_http_base_url() {
        let args = CliArgs::try_parse_from(["posts", "--base-url", "ftp://example.com"]).unwrap();
        assert!(matches!(args.validate(), Err(ConfigError::InvalidBaseUrl(_))));
    }

    #[test]
    fn rejects_zero_timeout() {
        let args = CliArgs::try_parse_from(["posts", "--timeout-secs", "0"]).unwrap();
        assert!(matches!(args.validate(), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        assert!(CliArgs::try_parse_from(["posts", "--timeout-secs", "soon"]).is_err());
    }
}
