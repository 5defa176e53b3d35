use super::WallpaperSetter;
use crate::state::DisplayOption;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone)]
pub struct ScriptSetter {
    script: PathBuf,
}

impl ScriptSetter {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
        }
    }

    pub fn script(&self) -> &Path {
        &self.script
    }
}

impl WallpaperSetter for ScriptSetter {
    fn set_wallpaper(&self, path: &Path, option: DisplayOption) -> Result<()> {
        tracing::debug!(
            "Running {} for {} ({option})",
            self.script.display(),
            path.display()
        );

        let output = Command::new(&self.script)
            .env("WALLPAPER", path)
            .env("WALLPAPER_OPTIONS", option.as_str())
            .output()
            .map_err(|source| Error::ScriptSpawn {
                script: self.script.clone(),
                source,
            })?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(Error::Script {
                status: output.status,
                output: combined,
            });
        }

        Ok(())
    }
}
