pub mod paths;
pub mod profile;
pub mod settings;

pub use paths::AppPaths;
pub use profile::{DEFAULT_PROFILE, resolve_profile};
pub use settings::Settings;

use crate::error::AppResult;

/// Settings for `profile`, validated; defaults when the profile has no file.
pub fn load_settings(paths: &AppPaths, profile: &str) -> AppResult<Settings> {
    let file = paths.settings_file(profile);
    log::debug!("loading profile `{profile}` from {}", file.display());
    settings::load(&file)
}

pub fn save_settings(paths: &AppPaths, profile: &str, settings: &Settings) -> AppResult<()> {
    let file = paths.settings_file(profile);
    settings::save(&file, settings)?;
    log::info!("saved profile `{profile}` to {}", file.display());
    Ok(())
}
