use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::{Error, Result};

const APP_DIR: &str = "turnforge";
const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const API_KEY_FIELD: &str = "anthropic_api_key";

/// Configuration directory: `$XDG_CONFIG_HOME/turnforge`, defaulting to
/// `~/.config/turnforge`. Created on demand.
pub fn config_dir() -> Result<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .map(|home| home.join(".config"))
            .ok_or_else(|| Error::Config("cannot determine home directory".to_string()))?,
    };
    let dir = base.join(APP_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// Load the config file; missing or unreadable files are an empty config.
pub fn load_config() -> Map<String, Value> {
    let Ok(path) = config_path() else {
        return Map::new();
    };
    std::fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
        .and_then(|value| value.as_object().cloned())
        .unwrap_or_default()
}

/// Save the config file with owner-only permissions.
pub fn save_config(config: &Map<String, Value>) -> Result<()> {
    let path = config_path()?;
    let body = serde_json::to_string_pretty(&Value::Object(config.clone()))?;
    std::fs::write(&path, body)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

/// API key for the LLM transport.
///
/// The environment variable wins over the stored config file.
pub fn get_api_key() -> Option<String> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.is_empty() {
            return Some(key);
        }
    }
    load_config()
        .get(API_KEY_FIELD)
        .and_then(Value::as_str)
        .map(str::to_string)
}

pub fn set_api_key(api_key: &str) -> Result<()> {
    let mut config = load_config();
    config.insert(API_KEY_FIELD.to_string(), Value::String(api_key.to_string()));
    save_config(&config)
}
