use crate::{DateCode, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// How the set-script should size the picture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayOption {
    #[default]
    Fit,
    Zoom,
}

impl DisplayOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayOption::Fit => "fit",
            DisplayOption::Zoom => "zoom",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            DisplayOption::Fit => DisplayOption::Zoom,
            DisplayOption::Zoom => DisplayOption::Fit,
        }
    }
}

impl fmt::Display for DisplayOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    #[serde(rename = "DateCode")]
    pub date: DateCode,
    #[serde(rename = "Options")]
    pub option: DisplayOption,
}

impl State {
    pub fn new(date: DateCode, option: DisplayOption) -> Self {
        Self { date, option }
    }
}

#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored state, or `(today, fit)` when nothing was stored yet.
    pub fn read(&self, today: DateCode) -> Result<State> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(State::new(today, DisplayOption::Fit));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map_err(Error::State)
    }

    pub fn write(&self, state: &State) -> Result<()> {
        let content = serde_json::to_string(state).map_err(Error::State)?;
        fs::write(&self.path, content + "\n")?;
        Ok(())
    }
}
