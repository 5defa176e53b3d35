pub mod apod;
pub mod config;
pub mod date;
pub mod desktop;
pub mod frontend;
pub mod loader;
pub mod notify;
pub mod state;
pub mod storage;
pub mod utils;

pub use apod::ApodClient;
pub use config::{Config, Paths};
pub use date::DateCode;
pub use desktop::{Desktop, WallpaperSetter};
pub use frontend::Frontend;
pub use loader::{Download, Loader};
pub use notify::Notifier;
pub use state::{DisplayOption, State};
pub use storage::ImageStore;

use std::path::PathBuf;
use std::process::ExitStatus;

const CONFIG_NOT_FOUND: &str = "configuration file was not found. Please run apod-bg --config=<barewm|gnome|lxde> first, see the man page for more information.";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status} while fetching {url}")]
    Http {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Desktop environment error: {0}")]
    DesktopEnv(String),

    #[error("{}", CONFIG_NOT_FOUND)]
    ConfigNotFound,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Malformed state file: {0}")]
    State(#[source] serde_json::Error),
    #[error("Invalid date code {0:?}, expected YYMMDD")]
    InvalidDate(String),

    #[error("{0} was not found")]
    NotFound(DateCode),
    #[error("Begin reached")]
    BeginReached,
    #[error("End reached")]
    EndReached,
    #[error("No backgrounds downloaded yet")]
    NoBackgrounds,

    #[error("Could not save the image for {date}: {source}")]
    Save {
        date: DateCode,
        #[source]
        source: Box<Error>,
    },

    #[error("Error running wallpaper set-script: {status}. Output: {output}")]
    Script { status: ExitStatus, output: String },
    #[error("Could not run wallpaper set-script {}: {source}", .script.display())]
    ScriptSpawn {
        script: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// True when the page did link an image but storing it failed.
    pub fn image_found(&self) -> bool {
        matches!(self, Error::Save { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
