use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Default listen address (the web UI and token endpoint share one port).
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Default directory of the static web UI bundle.
pub const DEFAULT_WEB_ROOT: &str = "web/public";

/// Length of account and API key identifiers: two-letter prefix + 32 hex chars.
const SID_LENGTH: usize = 34;

/// Prefix of account identifiers.
const ACCOUNT_SID_PREFIX: &str = "AC";

/// Prefix of API key identifiers.
const API_KEY_PREFIX: &str = "SK";

/// Prefix accepted as a fallback for every credential variable.
const LEGACY_ENV_PREFIX: &str = "TWILIO_";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub web_root: PathBuf,
    pub credentials: ApiCredentials,
    pub drain_seconds: u64,
}

/// Server-held signing material. Never sent to clients.
///
/// Only constructible through [`ApiCredentials::new`], so a value of this
/// type is always well-formed.
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    account_sid: String,
    api_key_sid: String,
    api_secret: SecretString,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid account SID: expected 'AC' followed by 32 hex characters")]
    InvalidAccountSid,

    #[error("Invalid API key: expected 'SK' followed by 32 hex characters")]
    InvalidApiKey,

    #[error("Invalid API secret: {0}")]
    InvalidApiSecret(String),

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Invalid drain seconds: {0}")]
    InvalidDrainSeconds(String),
}

impl ApiCredentials {
    /// Validate and wrap the credential triple.
    pub fn new(
        account_sid: impl Into<String>,
        api_key_sid: impl Into<String>,
        api_secret: SecretString,
    ) -> Result<Self, ConfigError> {
        let account_sid = account_sid.into();
        let api_key_sid = api_key_sid.into();

        if !is_valid_sid(&account_sid, ACCOUNT_SID_PREFIX) {
            return Err(ConfigError::InvalidAccountSid);
        }

        if !is_valid_sid(&api_key_sid, API_KEY_PREFIX) {
            return Err(ConfigError::InvalidApiKey);
        }

        let secret = api_secret.expose_secret();
        if secret.is_empty() {
            return Err(ConfigError::InvalidApiSecret("must not be empty".to_string()));
        }
        if secret.trim() != secret {
            return Err(ConfigError::InvalidApiSecret(
                "must not have leading or trailing whitespace".to_string(),
            ));
        }

        Ok(Self {
            account_sid,
            api_key_sid,
            api_secret,
        })
    }

    pub fn account_sid(&self) -> &str {
        &self.account_sid
    }

    pub fn api_key_sid(&self) -> &str {
        &self.api_key_sid
    }

    pub fn api_secret(&self) -> &SecretString {
        &self.api_secret
    }
}

fn is_valid_sid(value: &str, prefix: &str) -> bool {
    value.len() == SID_LENGTH
        && value
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Look up `name`, falling back to `TWILIO_<name>`. Empty values count as unset.
fn lookup<'a>(vars: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    vars.get(name)
        .or_else(|| vars.get(&format!("{LEGACY_ENV_PREFIX}{name}")))
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

fn require<'a>(vars: &'a HashMap<String, String>, name: &str) -> Result<&'a str, ConfigError> {
    lookup(vars, name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let account_sid = require(vars, "ACCOUNT_SID")?;
        let api_key_sid = require(vars, "API_KEY")?;
        let api_secret = SecretString::from(require(vars, "API_SECRET")?.to_string());

        let credentials = ApiCredentials::new(account_sid, api_key_sid, api_secret)?;

        let bind_str = vars
            .get("BIND_ADDRESS")
            .map(String::as_str)
            .unwrap_or(DEFAULT_BIND_ADDRESS);
        let mut bind_address: SocketAddr = bind_str
            .parse()
            .map_err(|e| ConfigError::InvalidBindAddress(format!("{bind_str}: {e}")))?;

        if let Some(port) = vars.get("PORT") {
            let port: u16 = port
                .parse()
                .map_err(|e| ConfigError::InvalidPort(format!("{port}: {e}")))?;
            bind_address.set_port(port);
        }

        let web_root = vars
            .get("WEB_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WEB_ROOT));

        let drain_seconds = match vars.get("DRAIN_SECONDS") {
            Some(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidDrainSeconds(format!("{value}: {e}")))?,
            None => 0,
        };

        Ok(Config {
            bind_address,
            web_root,
            credentials,
            drain_seconds,
        })
    }
}
