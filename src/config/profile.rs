use crate::error::{AppError, AppResult};

pub const DEFAULT_PROFILE: &str = "default";

/// Profile names become file names under the profiles directory.
pub fn resolve_profile(requested: &str) -> AppResult<String> {
    let name = requested.trim();
    if name.is_empty() {
        return Ok(DEFAULT_PROFILE.to_string());
    }

    if name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(AppError::Config(format!("invalid profile name `{name}`")));
    }

    Ok(name.to_string())
}
