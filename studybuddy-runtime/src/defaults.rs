use std::path::{Path, PathBuf};

use studybuddy_core::config::AppConfig;

pub const APP_DIR_NAME: &str = "studybuddy";
pub const CONFIG_FILE_NAME: &str = "config.json";

pub fn default_config() -> AppConfig {
    AppConfig::default()
}

/// `<base>/studybuddy`, where `base` is the platform config dir or an explicit override.
pub fn app_dir(base: &Path) -> PathBuf {
    base.join(APP_DIR_NAME)
}

pub fn config_path(base: &Path) -> PathBuf {
    app_dir(base).join(CONFIG_FILE_NAME)
}
