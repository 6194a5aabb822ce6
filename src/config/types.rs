//! Settings file shape (`appsettings.json`) and the resolved runtime settings.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SettingsFile {
    #[serde(default)]
    pub connection_strings: ConnectionStrings,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub database: DatabaseSection,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConnectionStrings {
    #[serde(default)]
    pub default_connection: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerSection {
    #[serde(default)]
    pub bind_address: Option<String>,
    #[serde(default)]
    pub https_port: Option<u16>,
    #[serde(default)]
    pub static_root: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DatabaseSection {
    #[serde(default)]
    pub max_connections: Option<u32>,
    #[serde(default)]
    pub ensure_schema: Option<bool>,
}

impl SettingsFile {
    /// Layer `overlay` on top of `self`; values present in the overlay win.
    pub fn merge(self, overlay: SettingsFile) -> SettingsFile {
        SettingsFile {
            connection_strings: ConnectionStrings {
                default_connection: overlay
                    .connection_strings
                    .default_connection
                    .or(self.connection_strings.default_connection),
            },
            server: ServerSection {
                bind_address: overlay.server.bind_address.or(self.server.bind_address),
                https_port: overlay.server.https_port.or(self.server.https_port),
                static_root: overlay.server.static_root.or(self.server.static_root),
            },
            database: DatabaseSection {
                max_connections: overlay.database.max_connections.or(self.database.max_connections),
                ensure_schema: overlay.database.ensure_schema.or(self.database.ensure_schema),
            },
        }
    }
}

/// Hosting environment name (`Development`, `Staging`, `Production`, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostEnvironment(String);

impl HostEnvironment {
    pub const DEVELOPMENT: &'static str = "Development";
    pub const PRODUCTION: &'static str = "Production";

    pub fn new(name: impl Into<String>) -> Self {
        HostEnvironment(name.into())
    }

    pub fn development() -> Self {
        Self::new(Self::DEVELOPMENT)
    }

    pub fn production() -> Self {
        Self::new(Self::PRODUCTION)
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_development(&self) -> bool {
        self.0.eq_ignore_ascii_case(Self::DEVELOPMENT)
    }
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self::production()
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub environment: HostEnvironment,
    pub connection_string: String,
    pub bind_address: SocketAddr,
    /// Target port for HTTP -> HTTPS redirects; `None` disables the redirect.
    pub https_port: Option<u16>,
    pub static_root: PathBuf,
    pub max_connections: u32,
    /// Create the products table at startup when it does not exist.
    pub ensure_schema: bool,
    /// Raw HMAC key for anti-forgery tokens; generated per process when absent.
    pub antiforgery_key: Option<Vec<u8>>,
}
