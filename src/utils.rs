use crate::{Error, Result};
use std::path::PathBuf;

/// `$XDG_CONFIG_HOME/apod-bg`, falling back to `$HOME/.config/apod-bg`.
pub fn get_config_dir() -> Result<PathBuf> {
    base_config_dir().map(|dir| dir.join("apod-bg"))
}

pub fn get_autostart_dir() -> Result<PathBuf> {
    base_config_dir().map(|dir| dir.join("autostart"))
}

fn base_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".config"))
        })
        .ok_or_else(|| {
            Error::Config(
                "Could not find config directory. Please set HOME or XDG_CONFIG_HOME environment variable."
                    .to_string(),
            )
        })
}
