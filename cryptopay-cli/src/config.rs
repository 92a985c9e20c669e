//! CLI configuration.
//!
//! Settings are layered: a TOML file, then `CRYPTO_PAY_*` environment
//! variables, then command-line flags. String values in the file may
//! reference environment variables as `$VAR` or `${VAR}`.
//!
//! # Example Configuration
//!
//! ```toml
//! token = "$CRYPTO_PAY_TOKEN"
//! network = "testnet"
//! timeout_secs = 10
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to configuration file (default: `cryptopay.toml`)
//! - `CRYPTO_PAY_TOKEN` - API token
//! - `CRYPTO_PAY_NETWORK` - `mainnet` or `testnet`
//! - `CRYPTO_PAY_BASE_URL` - Custom endpoint, overrides the network

use std::path::Path;
use std::time::Duration;

use cryptopay::{ClientConfig, Network};
use serde::{Deserialize, Serialize};

/// Default configuration file name.
pub const DEFAULT_CONFIG_PATH: &str = "cryptopay.toml";

/// Resolved CLI settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// API token.
    #[serde(default)]
    pub token: Option<String>,

    /// Gateway deployment (default: testnet).
    #[serde(default)]
    pub network: Network,

    /// Custom endpoint. Takes precedence over `network`.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Values given on the command line. `None` leaves the lower layer in place.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--token`.
    pub token: Option<String>,
    /// `--network`.
    pub network: Option<Network>,
    /// `--base-url`.
    pub base_url: Option<String>,
    /// `--timeout`.
    pub timeout_secs: Option<u64>,
}

impl CliConfig {
    /// Loads the file named by `CONFIG` (or the default path), then applies
    /// environment variables.
    ///
    /// A missing file is not an error; every setting then comes from the
    /// environment or the command line.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if
    /// `CRYPTO_PAY_NETWORK` names an unknown network.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = std::env::var("CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        let mut config = Self::load_from(&path)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = if Path::new(path).exists() {
            std::fs::read_to_string(path)?
        } else {
            String::new()
        };
        Self::parse(&content, |name| std::env::var(name).ok())
    }

    /// Parses TOML text, expanding variable references with `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if the expanded text is not a valid config.
    pub fn parse(
        content: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let expanded = expand_vars(content, lookup);
        Ok(toml::from_str(&expanded)?)
    }

    /// Overrides file values with `CRYPTO_PAY_*` variables found by `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if `CRYPTO_PAY_NETWORK` is not a known network.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), cryptopay::Error> {
        if let Some(token) = lookup("CRYPTO_PAY_TOKEN") {
            self.token = Some(token);
        }
        if let Some(network) = lookup("CRYPTO_PAY_NETWORK") {
            self.network = network.parse()?;
        }
        if let Some(base_url) = lookup("CRYPTO_PAY_BASE_URL") {
            self.base_url = Some(base_url);
        }
        Ok(())
    }

    /// Applies command-line flags on top of everything else.
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(token) = overrides.token {
            self.token = Some(token);
        }
        if let Some(network) = overrides.network {
            self.network = network;
            // An explicit network flag beats an inherited custom endpoint.
            if overrides.base_url.is_none() {
                self.base_url = None;
            }
        }
        if let Some(base_url) = overrides.base_url {
            self.base_url = Some(base_url);
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout_secs = Some(secs);
        }
    }

    /// Returns the request timeout, if configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Builds the library client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`cryptopay::Error::Config`] if no token is configured, or a
    /// URL error for a malformed custom endpoint.
    pub fn client_config(&self) -> Result<ClientConfig, cryptopay::Error> {
        let token = self.token.clone().unwrap_or_default();
        match &self.base_url {
            Some(base_url) => ClientConfig::with_base_url(token, base_url),
            None => ClientConfig::new(token, self.network),
        }
    }
}

/// Expands `$VAR` and `${VAR}` patterns using `lookup`.
///
/// Unresolved variables are left as-is.
fn expand_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }
        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }

        let mut name = String::new();
        while let Some(&c) = chars.peek() {
            if braced {
                if c == '}' {
                    chars.next();
                    break;
                }
            } else if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            name.push(c);
            chars.next();
        }

        match lookup(&name).filter(|_| !name.is_empty()) {
            Some(value) => result.push_str(&value),
            None => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&name);
                if braced && !name.is_empty() {
                    result.push('}');
                }
            }
        }
    }

    result
}
