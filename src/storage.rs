use crate::{DateCode, Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const IMG_PREFIX: &str = "apod-img-";

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, date: DateCode) -> PathBuf {
        self.dir.join(file_name(date))
    }

    pub fn is_present(&self, date: DateCode) -> Result<bool> {
        match fs::metadata(self.path_for(date)) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Downloaded days sorted by their `YYMMDD` code. Files that do not
    /// follow the naming scheme are skipped.
    pub fn list_present(&self) -> Result<Vec<DateCode>> {
        let mut dates = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let file_name = entry?.file_name();
            let Some(code) = file_name
                .to_str()
                .and_then(|name| name.strip_prefix(IMG_PREFIX))
            else {
                continue;
            };
            match code.parse::<DateCode>() {
                Ok(date) => dates.push(date),
                Err(_) => tracing::debug!("Ignoring {:?} in wallpaper directory", file_name),
            }
        }

        dates.sort_by_key(ToString::to_string);
        Ok(dates)
    }

    pub fn index_of(&self, date: DateCode) -> Result<usize> {
        self.list_present()?
            .iter()
            .position(|d| *d == date)
            .ok_or(Error::NotFound(date))
    }
}

fn file_name(date: DateCode) -> String {
    format!("{IMG_PREFIX}{date}")
}
