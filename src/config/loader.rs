//! Resolve settings from environment variables and `appsettings.json`.
//!
//! Environment variables win over the settings file; the settings file is optional, but
//! a connection string must come from one of them.

use crate::config::types::{HostEnvironment, Settings, SettingsFile};
use crate::error::ConfigError;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const CONNECTION_STRING_VAR: &str = "SQL_CONNECTION_STRING";
pub const SETTINGS_PATH_VAR: &str = "CATALOG_SETTINGS";
pub const ENVIRONMENT_VAR: &str = "APP_ENVIRONMENT";
pub const ASPNETCORE_ENVIRONMENT_VAR: &str = "ASPNETCORE_ENVIRONMENT";
pub const BIND_ADDRESS_VAR: &str = "BIND_ADDRESS";
pub const HTTPS_PORT_VAR: &str = "HTTPS_PORT";
pub const MAX_CONNECTIONS_VAR: &str = "DATABASE_MAX_CONNECTIONS";
pub const ANTIFORGERY_KEY_VAR: &str = "ANTIFORGERY_KEY";

const DEFAULT_SETTINGS_PATH: &str = "appsettings.json";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_STATIC_ROOT: &str = "wwwroot";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const MIN_ANTIFORGERY_KEY_LEN: usize = 32;

/// Load settings from the process environment.
pub fn load() -> Result<Settings, ConfigError> {
    load_with(|key| std::env::var(key).ok())
}

/// Load settings using `lookup` for environment variables.
pub fn load_with<F>(lookup: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let environment = var(ENVIRONMENT_VAR)
        .or_else(|| var(ASPNETCORE_ENVIRONMENT_VAR))
        .map(HostEnvironment::new)
        .unwrap_or_default();

    let settings_path = PathBuf::from(var(SETTINGS_PATH_VAR).unwrap_or_else(|| DEFAULT_SETTINGS_PATH.into()));
    let file = read_layered_settings(&settings_path, &environment)?;

    let connection_string = resolve_connection_string(var(CONNECTION_STRING_VAR), &file)?;

    let bind_raw = var(BIND_ADDRESS_VAR)
        .or_else(|| file.server.bind_address.clone())
        .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.into());
    let bind_address: SocketAddr = bind_raw.parse().map_err(|e| ConfigError::Invalid {
        key: BIND_ADDRESS_VAR,
        message: format!("'{}': {}", bind_raw, e),
    })?;

    let https_port = match var(HTTPS_PORT_VAR) {
        Some(raw) => Some(raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
            key: HTTPS_PORT_VAR,
            message: format!("'{}': {}", raw, e),
        })?),
        None => file.server.https_port,
    };

    let max_connections = match var(MAX_CONNECTIONS_VAR) {
        Some(raw) => raw.parse::<u32>().map_err(|e| ConfigError::Invalid {
            key: MAX_CONNECTIONS_VAR,
            message: format!("'{}': {}", raw, e),
        })?,
        None => file.database.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
    };
    if max_connections == 0 {
        return Err(ConfigError::Invalid {
            key: MAX_CONNECTIONS_VAR,
            message: "must be at least 1".into(),
        });
    }

    let antiforgery_key = var(ANTIFORGERY_KEY_VAR).map(|raw| decode_antiforgery_key(&raw)).transpose()?;

    Ok(Settings {
        environment,
        connection_string,
        bind_address,
        https_port,
        static_root: PathBuf::from(
            file.server
                .static_root
                .clone()
                .unwrap_or_else(|| DEFAULT_STATIC_ROOT.into()),
        ),
        max_connections,
        ensure_schema: file.database.ensure_schema.unwrap_or(false),
        antiforgery_key,
    })
}

/// Environment variable first, then `ConnectionStrings:DefaultConnection`, else an error.
pub fn resolve_connection_string(from_env: Option<String>, file: &SettingsFile) -> Result<String, ConfigError> {
    from_env
        .or_else(|| {
            file.connection_strings
                .default_connection
                .clone()
                .filter(|s| !s.trim().is_empty())
        })
        .ok_or(ConfigError::MissingConnectionString)
}

/// Base settings file plus its `appsettings.{Environment}.json` overlay. Missing files are empty.
fn read_layered_settings(path: &Path, environment: &HostEnvironment) -> Result<SettingsFile, ConfigError> {
    let base = read_settings_file(path)?.unwrap_or_default();
    match read_settings_file(&environment_overlay_path(path, environment))? {
        Some(overlay) => Ok(base.merge(overlay)),
        None => Ok(base),
    }
}

fn environment_overlay_path(path: &Path, environment: &HostEnvironment) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("appsettings");
    let file_name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}.{}", stem, environment.name(), ext),
        None => format!("{}.{}", stem, environment.name()),
    };
    path.with_file_name(file_name)
}

fn read_settings_file(path: &Path) -> Result<Option<SettingsFile>, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    tracing::debug!(path = %path.display(), "loaded settings file");
    serde_json::from_str(&raw).map(Some).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn decode_antiforgery_key(raw: &str) -> Result<Vec<u8>, ConfigError> {
    let key = BASE64_STANDARD.decode(raw).map_err(|e| ConfigError::Invalid {
        key: ANTIFORGERY_KEY_VAR,
        message: e.to_string(),
    })?;
    if key.len() < MIN_ANTIFORGERY_KEY_LEN {
        return Err(ConfigError::Invalid {
            key: ANTIFORGERY_KEY_VAR,
            message: format!("must decode to at least {} bytes", MIN_ANTIFORGERY_KEY_LEN),
        });
    }
    Ok(key)
}
