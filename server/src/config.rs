use anyhow::{Context, Result};
use harvester_client::{BackendConfig, Protocol};
use std::fmt;
use tracing::warn;

pub const HARVESTER_HOST: &str = "HARVESTER_HOST";
pub const HARVESTER_PORT: &str = "HARVESTER_PORT";
pub const HARVESTER_PROTOCOL: &str = "HARVESTER_PROTOCOL";
pub const HARVESTER_AUTH_BASIC_USERNAME: &str = "HARVESTER_AUTH_BASIC_USERNAME";
pub const HARVESTER_AUTH_BASIC_PASSWORD: &str = "HARVESTER_AUTH_BASIC_PASSWORD";
pub const ACL_FILTER_BY_TENANT: &str = "ACL_FILTER_BY_TENANT";
pub const SERVICE_PORT: &str = "PORT";

pub const DEFAULT_SERVICE_PORT: u16 = 8080;

/// Dotted names used by existing deployments, read when the primary name is unset
const DOTTED_NAMES: [(&str, &str); 6] = [
    (HARVESTER_HOST, "harvester.host"),
    (HARVESTER_PORT, "harvester.port"),
    (HARVESTER_PROTOCOL, "harvester.protocol"),
    (HARVESTER_AUTH_BASIC_USERNAME, "harvester.auth.basic.username"),
    (HARVESTER_AUTH_BASIC_PASSWORD, "harvester.auth.basic.password"),
    (ACL_FILTER_BY_TENANT, "acl_filter.by_tenant"),
];

fn setting(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).or_else(|| {
        DOTTED_NAMES
            .iter()
            .find(|(primary, _)| *primary == name)
            .and_then(|(_, dotted)| lookup(dotted))
    })
}

/// Startup configuration, read once and handed to the components that need it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub harvester: BackendConfig,
    pub service_port: u16,
    /// Accepted for compatibility; no backend call is filtered by tenant yet
    pub filter_by_tenant: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |name: &str| setting(&lookup, name);

        let host = lookup(HARVESTER_HOST)
            .filter(|h| !h.trim().is_empty())
            .with_context(|| {
                format!("{HARVESTER_HOST} is required to run the harvester admin service")
            })?;

        let protocol = match lookup(HARVESTER_PROTOCOL) {
            Some(p) => p.parse::<Protocol>()?,
            None => Protocol::default(),
        };

        let mut harvester = BackendConfig::new(protocol, host)?;

        if let Some(port) = lookup(HARVESTER_PORT) {
            let port = port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid {HARVESTER_PORT}: {port}"))?;
            harvester = harvester.with_port(port);
        }

        match (
            lookup(HARVESTER_AUTH_BASIC_USERNAME),
            lookup(HARVESTER_AUTH_BASIC_PASSWORD),
        ) {
            (Some(username), Some(password)) => {
                harvester = harvester.with_basic_auth(username, password);
            }
            (None, None) => {}
            _ => warn!(
                "Only one of {} and {} is set, not using basic auth",
                HARVESTER_AUTH_BASIC_USERNAME, HARVESTER_AUTH_BASIC_PASSWORD
            ),
        }

        let service_port = match lookup(SERVICE_PORT) {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid {SERVICE_PORT}: {port}"))?,
            None => DEFAULT_SERVICE_PORT,
        };

        let filter_by_tenant = !lookup(ACL_FILTER_BY_TENANT)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("false"));

        Ok(Self {
            harvester,
            service_port,
            filter_by_tenant,
        })
    }
}

impl fmt::Display for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "harvester-admin on port {}, proxying {}",
            self.service_port,
            self.harvester.base_url()
        )
    }
}
