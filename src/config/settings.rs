use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::client::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use crate::error::{AppError, AppResult};

const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub refresh_interval_secs: Option<u64>,
    #[serde(default)]
    pub invalidate_sent_on_move: Option<bool>,
}

impl Settings {
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn timeout(&self) -> AppResult<Duration> {
        match self.timeout_secs {
            None => Ok(DEFAULT_TIMEOUT),
            Some(0) => Err(AppError::Config(
                "timeout_secs must be greater than 0".to_string(),
            )),
            Some(secs) => Ok(Duration::from_secs(secs)),
        }
    }

    pub fn refresh_interval(&self) -> AppResult<Duration> {
        match self.refresh_interval_secs {
            None => Ok(DEFAULT_REFRESH_INTERVAL),
            Some(0) => Err(AppError::Config(
                "refresh_interval_secs must be greater than 0".to_string(),
            )),
            Some(secs) => Ok(Duration::from_secs(secs)),
        }
    }

    pub fn invalidate_sent_on_move(&self) -> bool {
        self.invalidate_sent_on_move.unwrap_or(true)
    }

    /// Checks every value the engine will derive from these settings.
    pub fn validate(&self) -> AppResult<()> {
        self.timeout()?;
        self.refresh_interval()?;
        let endpoint = self.endpoint();
        match Url::parse(endpoint) {
            Ok(url) if !url.cannot_be_a_base() => Ok(()),
            _ => Err(AppError::Config(format!(
                "endpoint `{endpoint}` is not a usable base url"
            ))),
        }
    }
}

/// Reads a profile's settings. A missing file means all defaults; a file
/// that does not parse or holds unusable values is a config error.
pub fn load(path: &Path) -> AppResult<Settings> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::debug!("no settings at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        Err(err) => return Err(err.into()),
    };

    let settings: Settings = serde_json::from_str(&raw)
        .map_err(|err| AppError::Config(format!("{}: {err}", path.display())))?;
    settings.validate()?;
    Ok(settings)
}

/// Writes settings readable by the owner only. Values that [`load`] would
/// reject are refused up front.
pub fn save(path: &Path, settings: &Settings) -> AppResult<()> {
    settings.validate()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut payload = serde_json::to_string_pretty(settings)?;
    payload.push('\n');
    fs::write(path, payload)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
