use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unrecognized protocol '{0}', expected 'http' or 'https'")]
    UnknownProtocol(String),

    #[error("Harvester host must not be empty")]
    MissingHost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    pub fn default_port(self) -> u16 {
        match self {
            Protocol::Http => 80,
            Protocol::Https => 443,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            _ => Err(ConfigError::UnknownProtocol(s.to_string())),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

// Keeps the password out of logs
impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Where the Harvester lives and how to authenticate against it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    pub basic_auth: Option<BasicAuth>,
}

impl BackendConfig {
    /// Config for `host` with the protocol's default port and no credentials
    pub fn new(protocol: Protocol, host: impl Into<String>) -> Result<Self, ConfigError> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(ConfigError::MissingHost);
        }
        Ok(Self {
            protocol,
            host,
            port: protocol.default_port(),
            basic_auth: None,
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some(BasicAuth {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_parsing() {
        assert_eq!("http".parse::<Protocol>(), Ok(Protocol::Http));
        assert_eq!("HTTPS".parse::<Protocol>(), Ok(Protocol::Https));
        assert_eq!(
            "ftp".parse::<Protocol>(),
            Err(ConfigError::UnknownProtocol("ftp".to_string()))
        );
    }

    #[test]
    fn test_default_ports() {
        let http = BackendConfig::new(Protocol::Http, "harvester").unwrap();
        assert_eq!(http.base_url(), "http://harvester:80");

        let https = BackendConfig::new(Protocol::Https, "harvester").unwrap();
        assert_eq!(https.base_url(), "https://harvester:443");

        let custom = https.with_port(8443);
        assert_eq!(custom.base_url(), "https://harvester:8443");
    }

    #[test]
    fn test_empty_host_rejected() {
        assert_eq!(
            BackendConfig::new(Protocol::Http, "  "),
            Err(ConfigError::MissingHost)
        );
    }

    #[test]
    fn test_basic_auth_debug_hides_password() {
        let config = BackendConfig::new(Protocol::Http, "h")
            .unwrap()
            .with_basic_auth("admin", "secret");
        let rendered = format!("{config:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("secret"));
    }
}
