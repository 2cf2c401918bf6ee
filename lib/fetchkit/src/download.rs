//! Downloaded files and where they end up.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use tracing::debug;

use crate::Result;

/// Filename used when neither the response nor the caller names the file.
pub const DEFAULT_FILENAME: &str = "download";

/// How many numbered names are tried before a save gives up.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// A downloaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

impl Download {
    /// A download named `filename`.
    #[must_use]
    pub fn new(filename: impl Into<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            data,
        }
    }

    /// Resolved filename.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The same download under another name.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Response content type, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// File contents.
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consumes the download, returning its contents.
    #[must_use]
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

/// Future returned by [`DownloadSink::save`], yielding the name the file
/// was stored under.
pub type SaveFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// Receives every completed download.
pub trait DownloadSink: Send + Sync {
    /// Saves `download` and returns the filename it ended up with, which
    /// may differ from [`Download::filename`]. The call fails when this
    /// fails.
    fn save<'a>(&'a self, download: &'a Download) -> SaveFuture<'a>;
}

/// Writes downloads into a directory.
///
/// Existing files are never replaced: when `report.csv` is taken the
/// download becomes `report (1).csv`, then `report (2).csv`, and so on.
/// Data goes to `<name>.part` first and is renamed into place, so a reader
/// never sees a partial file.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl Default for DirectorySink {
    fn default() -> Self {
        Self::new(".")
    }
}

impl DirectorySink {
    /// Saves into `dir`, which must exist.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where a download named `filename` is written when that name is free.
    #[must_use]
    pub fn target(&self, filename: &str) -> PathBuf {
        self.dir.join(sanitize_filename(filename))
    }

    /// Creates the first free candidate for `filename` so no other save
    /// can take it.
    async fn claim(&self, filename: &str) -> Result<(String, PathBuf)> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = numbered_name(filename, attempt);
            let path = self.dir.join(&name);
            let created = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;
            match created {
                Ok(_) => return Ok((name, path)),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
                Err(err) => return Err(err.into()),
            }
        }

        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free name for {filename} in {}", self.dir.display()),
        )
        .into())
    }
}

impl DownloadSink for DirectorySink {
    fn save<'a>(&'a self, download: &'a Download) -> SaveFuture<'a> {
        Box::pin(async move {
            let (name, target) = self.claim(&sanitize_filename(download.filename())).await?;
            let mut partial = target.clone().into_os_string();
            partial.push(".part");
            let partial = PathBuf::from(partial);

            let written = async {
                tokio::fs::write(&partial, download.data()).await?;
                tokio::fs::rename(&partial, &target).await
            }
            .await;

            if let Err(err) = written {
                let _ = tokio::fs::remove_file(&partial).await;
                let _ = tokio::fs::remove_file(&target).await;
                return Err(err.into());
            }

            debug!(path = %target.display(), bytes = download.data().len(), "download saved");
            Ok(name)
        })
    }
}

/// Keeps downloads in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    saved: Arc<Mutex<Vec<Download>>>,
}

impl MemorySink {
    /// An empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every download saved so far, oldest first.
    #[must_use]
    pub fn saved(&self) -> Vec<Download> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DownloadSink for MemorySink {
    fn save<'a>(&'a self, download: &'a Download) -> SaveFuture<'a> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(download.clone());
        let name = download.filename().to_string();
        Box::pin(async move { Ok(name) })
    }
}

/// Keeps the last path component and drops control characters, so a
/// server-supplied name cannot escape the target directory.
fn sanitize_filename(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>();

    match name.trim() {
        "" | "." | ".." => DEFAULT_FILENAME.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// `report.csv` for the first attempt, `report (n).csv` after that.
fn numbered_name(filename: &str, attempt: usize) -> String {
    if attempt == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({attempt}).{ext}"),
        _ => format!("{filename} ({attempt})"),
    }
}
