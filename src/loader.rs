use crate::notify::Notifier;
use crate::{ApodClient, DateCode, Error, ImageStore, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of fetching one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Download {
    Present,
    Fetched(PathBuf),
    /// The day's page links no picture (video, applet or no page at all).
    NoImage,
}

impl Download {
    pub fn found(&self) -> bool {
        !matches!(self, Download::NoImage)
    }
}

pub struct Loader<'a> {
    client: &'a ApodClient,
    store: &'a ImageStore,
    notifier: &'a dyn Notifier,
}

impl<'a> Loader<'a> {
    pub fn new(client: &'a ApodClient, store: &'a ImageStore, notifier: &'a dyn Notifier) -> Self {
        Self {
            client,
            store,
            notifier,
        }
    }

    /// Downloads the picture of `date` unless it is already stored.
    ///
    /// Failures after an image link was found come back as [`Error::Save`],
    /// so callers can tell "nothing published" apart from "publishing failed".
    pub async fn download(&self, date: DateCode) -> Result<Download> {
        if self.store.is_present(date)? {
            tracing::debug!("Not downloading {date}, it already exists");
            return Ok(Download::Present);
        }

        let Some(image_url) = self.client.image_url(date).await? else {
            tracing::info!("No image on APOD for {date}");
            return Ok(Download::NoImage);
        };

        self.notifier
            .notify(&format!("Downloading APOD-image for: {date}"));

        let file = self.store.path_for(date);
        self.save(&image_url, &file)
            .await
            .map_err(|e| Error::Save {
                date,
                source: Box::new(e),
            })?;

        tracing::info!("Successfully downloaded {date} to {}", file.display());
        Ok(Download::Fetched(file))
    }

    /// Downloads the `days` days before `from`, newest first. Stops at the
    /// first failure; days fetched before it stay on disk.
    pub async fn load_period(&self, from: DateCode, days: u32) -> Result<()> {
        for offset in 1..=days {
            let date = from.back_by(offset);
            match self.download(date).await? {
                Download::Fetched(_) | Download::Present => {}
                Download::NoImage => tracing::info!("Skipping {date}, no image published"),
            }
        }
        Ok(())
    }

    async fn save(&self, url: &str, file: &Path) -> Result<()> {
        let bytes = self.client.fetch_image(url).await?;
        fs::write(file, bytes)?;
        Ok(())
    }
}
