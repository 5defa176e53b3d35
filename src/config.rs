use crate::desktop::Desktop;
use crate::utils::{get_autostart_dir, get_config_dir};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all, read_to_string, write};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

const CONFIG_FILE: &str = "config.json";
const STATE_FILE: &str = "now-showing";
const SET_SCRIPT: &str = "set-wallpaper.sh";
const LOG_FILE: &str = "apod-bg.log";
const AUTOSTART_FILE: &str = "apod-bg.desktop";

const AUTOSTART_ENTRY: &str = "[Desktop Entry]
Type=Application
Name=APOD Background
Exec=apod-bg --login
";

#[derive(Debug, Clone)]
pub struct Paths {
    config_dir: PathBuf,
    autostart_dir: PathBuf,
}

impl Paths {
    pub fn new(config_dir: impl Into<PathBuf>, autostart_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            autostart_dir: autostart_dir.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(get_config_dir()?, get_autostart_dir()?))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    pub fn state_file(&self) -> PathBuf {
        self.config_dir.join(STATE_FILE)
    }

    pub fn set_script(&self) -> PathBuf {
        self.config_dir.join(SET_SCRIPT)
    }

    pub fn log_file(&self) -> PathBuf {
        self.config_dir.join(LOG_FILE)
    }

    pub fn default_wallpaper_dir(&self) -> PathBuf {
        self.config_dir.join("wallpapers")
    }

    pub fn autostart_file(&self) -> PathBuf {
        self.autostart_dir.join(AUTOSTART_FILE)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(rename = "WallpaperDir")]
    pub wallpaper_dir: PathBuf,
    #[serde(rename = "SetScript", default, skip_serializing_if = "Option::is_none")]
    pub set_script: Option<PathBuf>,
}

impl Config {
    pub fn new(wallpaper_dir: impl Into<PathBuf>) -> Self {
        Self {
            wallpaper_dir: wallpaper_dir.into(),
            set_script: None,
        }
    }

    /// The configured set-script, or the one `--config` writes.
    pub fn set_script_path(&self, paths: &Paths) -> PathBuf {
        self.set_script.clone().unwrap_or_else(|| paths.set_script())
    }

    pub fn load(paths: &Paths) -> Result<Self> {
        let content = match read_to_string(paths.config_file()) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(Error::ConfigNotFound),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn save(&self, paths: &Paths) -> Result<()> {
        create_dir_all(paths.config_dir())?;
        let content = serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        write(paths.config_file(), content)?;
        Ok(())
    }

    /// Sets apod-bg up for `desktop`: config directory, wallpaper directory,
    /// `config.json`, the stock set-script and, for LXDE, an autostart entry.
    pub fn configure(paths: &Paths, desktop: Desktop) -> Result<Self> {
        create_dir_all(paths.config_dir()).map_err(|e| {
            Error::Config(format!(
                "Could not create configuration directory {}: {e}",
                paths.config_dir().display()
            ))
        })?;

        let config = Self::new(paths.default_wallpaper_dir());
        create_dir_all(&config.wallpaper_dir)?;
        config.save(paths)?;

        write_script(&paths.set_script(), desktop.set_script())?;
        if desktop.needs_autostart() {
            write_autostart(paths)?;
        }

        tracing::info!("Configured apod-bg for {}", desktop.name());
        Ok(config)
    }

    pub fn unconfigure(paths: &Paths) -> Result<()> {
        match fs::remove_file(paths.autostart_file()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No autostart entry to remove");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn write_script(path: &Path, script: &str) -> Result<()> {
    write(path, script)?;
    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

fn write_autostart(paths: &Paths) -> Result<()> {
    let file = paths.autostart_file();
    if let Some(dir) = file.parent() {
        create_dir_all(dir)?;
    }
    write(file, AUTOSTART_ENTRY)?;
    Ok(())
}
