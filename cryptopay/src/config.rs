//! Client configuration: the API token and the gateway endpoint.
//!
//! # Environment Variables
//!
//! [`ClientConfig::from_env`] reads:
//!
//! - `CRYPTO_PAY_TOKEN` - API token (required)
//! - `CRYPTO_PAY_NETWORK` - `mainnet` or `testnet` (default: `testnet`)
//! - `CRYPTO_PAY_BASE_URL` - overrides the network endpoint

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// Production gateway endpoint.
pub const MAINNET_URL: &str = "https://pay.crypt.bot/api/";

/// Isolated test gateway endpoint. Tokens are not shared with mainnet.
pub const TESTNET_URL: &str = "https://testnet-pay.crypt.bot/api/";

/// Gateway deployment to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production.
    Mainnet,
    /// Test network.
    #[default]
    Testnet,
}

impl Network {
    /// Returns the base URL of this deployment.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Mainnet => MAINNET_URL,
            Self::Testnet => TESTNET_URL,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        })
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            other => Err(Error::Config(format!(
                "unknown network '{other}', expected 'mainnet' or 'testnet'"
            ))),
        }
    }
}

/// Crypto Pay API token.
///
/// Sent as a request header and hashed into the webhook key. The value is
/// never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wraps a token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, Error> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::Config("no token was provided for crypto pay".into()));
        }
        Ok(Self(token))
    }

    /// Returns the raw token.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

/// Immutable client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    token: ApiToken,
    base_url: Url,
}

impl ClientConfig {
    /// Creates a config for one of the public deployments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token is empty.
    pub fn new(token: impl Into<String>, network: Network) -> Result<Self, Error> {
        Self::with_base_url(token, network.base_url())
    }

    /// Creates a config for an arbitrary endpoint (e.g. a local mock).
    ///
    /// The base URL is normalized to end with a single `/` so that endpoint
    /// paths join beneath it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token or endpoint is empty, or
    /// [`Error::UrlParse`] if the endpoint is not a valid URL.
    pub fn with_base_url(token: impl Into<String>, base_url: &str) -> Result<Self, Error> {
        let token = ApiToken::new(token)?;
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(Error::Config(
                "no endpoint was provided for crypto pay".into(),
            ));
        }
        let base_url = Url::parse(&format!("{trimmed}/")).map_err(|source| Error::UrlParse {
            context: "Failed to parse base url",
            source,
        })?;
        Ok(Self { token, base_url })
    }

    /// Loads the config from `CRYPTO_PAY_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the token is missing or the network name
    /// is unknown.
    pub fn from_env() -> Result<Self, Error> {
        let token = std::env::var("CRYPTO_PAY_TOKEN")
            .map_err(|_| Error::Config("CRYPTO_PAY_TOKEN is not set".into()))?;
        if let Ok(base_url) = std::env::var("CRYPTO_PAY_BASE_URL") {
            return Self::with_base_url(token, &base_url);
        }
        let network = match std::env::var("CRYPTO_PAY_NETWORK") {
            Ok(name) => name.parse()?,
            Err(_) => Network::default(),
        };
        Self::new(token, network)
    }

    /// Returns the API token.
    #[must_use]
    pub const fn token(&self) -> &ApiToken {
        &self.token
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins an endpoint path (e.g. `"getMe"`) onto the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UrlParse`] if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| Error::UrlParse {
                context: "Failed to construct endpoint URL",
                source,
            })
    }
}
