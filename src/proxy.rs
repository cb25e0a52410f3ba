//! SOCKS5 endpoint representation and parsing.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::ParseError;

/// A SOCKS5 proxy address with optional credentials.
///
/// Equality is structural over host, user and password.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Proxy address, usually `ip:port`. Not validated.
    pub host: String,
    credentials: Option<(String, String)>,
}

impl Endpoint {
    /// Create an endpoint without credentials.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            credentials: None,
        }
    }

    /// Create an endpoint authenticating with `user` and `password`.
    pub fn with_auth(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            credentials: Some((user.into(), password.into())),
        }
    }

    /// Username, if the endpoint carries credentials.
    pub fn user(&self) -> Option<&str> {
        self.credentials.as_ref().map(|(user, _)| user.as_str())
    }

    /// Password, if the endpoint carries credentials.
    pub fn password(&self) -> Option<&str> {
        self.credentials.as_ref().map(|(_, password)| password.as_str())
    }

    /// Build the `socks5h://` URL for this endpoint, with percent-encoded
    /// credentials.
    ///
    /// Target hostnames are resolved by the proxy. Credentials with an
    /// empty user are not sent.
    pub fn proxy_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("socks5h://{}", self.host))?;
        let credentials = self
            .credentials
            .as_ref()
            .filter(|(user, _)| !user.is_empty());
        if let Some((user, password)) = credentials {
            // setters only fail on URLs without a host
            url.set_username(user)
                .map_err(|_| url::ParseError::EmptyHost)?;
            url.set_password(Some(password))
                .map_err(|_| url::ParseError::EmptyHost)?;
        }
        Ok(url)
    }

    /// Convert the endpoint to a `reqwest::Proxy` routing all traffic
    /// through it.
    pub fn to_reqwest_proxy(&self) -> Result<reqwest::Proxy, reqwest::Error> {
        match self.proxy_url() {
            Ok(url) => reqwest::Proxy::all(url),
            // let reqwest report the malformed address
            Err(_) => reqwest::Proxy::all(format!("socks5h://{}", self.host)),
        }
    }
}

/// Parse a `[user:password@]host` line.
///
/// The line is not trimmed and the host is not validated; a bad host is
/// caught when connecting.
pub fn parse_endpoint(line: &str) -> Result<Endpoint, ParseError> {
    let invalid = || ParseError {
        line: line.to_string(),
    };

    let parts: Vec<&str> = line.split('@').collect();
    match parts.as_slice() {
        [host] => Ok(Endpoint::new(*host)),
        [auth, host] => {
            let creds: Vec<&str> = auth.split(':').collect();
            match creds.as_slice() {
                [user, password] => Ok(Endpoint::with_auth(*host, *user, *password)),
                _ => Err(invalid()),
            }
        }
        _ => Err(invalid()),
    }
}

impl FromStr for Endpoint {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_endpoint(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.credentials {
            Some((user, password)) if !user.is_empty() => {
                write!(f, "{}:{}@{}", user, password, self.host)
            }
            _ => f.write_str(&self.host),
        }
    }
}
