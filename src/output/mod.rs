//! Output Actions: download / save the generated image.
//!
//! The result can be a `data:` URL or a remote URL.  [`FileDownloader`]
//! decodes or fetches it and writes it into the download directory, adding a
//! ` (n)` suffix when the name is taken.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::media::{self, data_url, MediaError};
use crate::notify::{messages, Notifier};
use crate::session::{lock_session, SharedSession};

/// File name of every saved result.
pub const DOWNLOAD_FILENAME: &str = "ai_edited_image.png";

// ---------------------------------------------------------------------------
// OutputError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("could not obtain image bytes: {0}")]
    Source(#[from] MediaError),

    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// DownloadSink
// ---------------------------------------------------------------------------

/// Where a "download" of the result goes.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Save `url` under `filename`; returns the final location.
    async fn download(&self, url: &str, filename: &str) -> Result<PathBuf, OutputError>;
}

/// Writes downloads into a directory on disk.
pub struct FileDownloader {
    dir: PathBuf,
    client: reqwest::Client,
}

impl FileDownloader {
    pub fn new(dir: impl Into<PathBuf>, client: reqwest::Client) -> Self {
        Self {
            dir: dir.into(),
            client,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn bytes_of(&self, url: &str) -> Result<Vec<u8>, MediaError> {
        if data_url::is_data_url(url) {
            Ok(data_url::decode(url)?.bytes)
        } else {
            Ok(media::fetch_bytes(&self.client, url).await?.0)
        }
    }
}

#[async_trait]
impl DownloadSink for FileDownloader {
    async fn download(&self, url: &str, filename: &str) -> Result<PathBuf, OutputError> {
        let bytes = self.bytes_of(url).await?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| OutputError::Write {
                path: self.dir.clone(),
                source,
            })?;

        let path = unique_path(&self.dir, filename);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| OutputError::Write {
                path: path.clone(),
                source,
            })?;

        log::info!("output: saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

/// `dir/name`, or the first free `dir/stem (n).ext`.
pub fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(filename);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    let ext = name.extension().map(|e| e.to_string_lossy().into_owned());

    (1..)
        .map(|n| match &ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

// ---------------------------------------------------------------------------
// OutputActions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No valid result is displayed.
    NothingToSave,
    Saved(PathBuf),
    Failed,
    /// Gallery saving is not available yet.
    NotAvailable,
}

pub struct OutputActions {
    session: SharedSession,
    sink: Arc<dyn DownloadSink>,
    notifier: Arc<dyn Notifier>,
}

impl OutputActions {
    pub fn new(
        session: SharedSession,
        sink: Arc<dyn DownloadSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            sink,
            notifier,
        }
    }

    /// Download button next to the URL field.
    pub async fn download_output(&self) -> SaveOutcome {
        self.save_current().await
    }

    /// "Save image" button.
    pub async fn save_individual(&self) -> SaveOutcome {
        self.save_current().await
    }

    /// Organised gallery export; announced only.
    pub fn save_gallery(&self) -> SaveOutcome {
        self.notifier.info(messages::GALLERY_IN_DEVELOPMENT);
        SaveOutcome::NotAvailable
    }

    async fn save_current(&self) -> SaveOutcome {
        let url = lock_session(&self.session)
            .current_result()
            .map(str::to_string);
        let Some(url) = url else {
            self.notifier.warn(messages::NOTHING_TO_SAVE);
            return SaveOutcome::NothingToSave;
        };

        match self.sink.download(&url, DOWNLOAD_FILENAME).await {
            Ok(path) => {
                self.notifier.info(&messages::saved_to(&path));
                SaveOutcome::Saved(path)
            }
            Err(e) => {
                log::error!("output: {e}");
                self.notifier.error(messages::SAVE_FAILED);
                SaveOutcome::Failed
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::notify::NoticeBoard;
    use crate::session::{new_shared_session, GenerationResult};

    #[derive(Default)]
    struct RecordingSink {
        downloads: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl DownloadSink for RecordingSink {
        async fn download(&self, url: &str, filename: &str) -> Result<PathBuf, OutputError> {
            self.downloads
                .lock()
                .unwrap()
                .push((url.to_string(), filename.to_string()));
            Ok(PathBuf::from("/downloads").join(filename))
        }
    }

    fn make_actions(result: Option<(&str, bool)>) -> (OutputActions, Arc<RecordingSink>, Arc<NoticeBoard>) {
        let session = new_shared_session();
        if let Some((url, visible)) = result {
            let mut st = lock_session(&session);
            st.generation.result = Some(GenerationResult { url: url.into() });
            st.generation.result_visible = visible;
        }
        let sink = Arc::new(RecordingSink::default());
        let board = Arc::new(NoticeBoard::new());
        (
            OutputActions::new(session, sink.clone(), board.clone()),
            sink,
            board,
        )
    }

    #[tokio::test]
    async fn nothing_displayed_means_nothing_saved() {
        for result in [None, Some(("https://cdn/x.png", false)), Some(("#", true)), Some(("", true))] {
            let (actions, sink, board) = make_actions(result);
            assert_eq!(actions.download_output().await, SaveOutcome::NothingToSave);
            assert_eq!(actions.save_individual().await, SaveOutcome::NothingToSave);
            assert!(sink.downloads.lock().unwrap().is_empty());
            assert_eq!(board.messages(), vec![messages::NOTHING_TO_SAVE.to_string(); 2]);
        }
    }

    #[tokio::test]
    async fn valid_result_is_downloaded_once_with_fixed_name() {
        let (actions, sink, board) = make_actions(Some(("https://cdn/x.png", true)));
        let outcome = actions.download_output().await;
        assert_eq!(
            outcome,
            SaveOutcome::Saved(PathBuf::from("/downloads/ai_edited_image.png"))
        );
        assert_eq!(
            *sink.downloads.lock().unwrap(),
            vec![("https://cdn/x.png".to_string(), DOWNLOAD_FILENAME.to_string())]
        );
        assert_eq!(board.snapshot().len(), 1);
    }

    #[test]
    fn gallery_is_announced_only() {
        let (actions, sink, board) = make_actions(Some(("https://cdn/x.png", true)));
        assert_eq!(actions.save_gallery(), SaveOutcome::NotAvailable);
        assert!(sink.downloads.lock().unwrap().is_empty());
        assert_eq!(board.messages(), vec![messages::GALLERY_IN_DEVELOPMENT.to_string()]);
    }

    #[tokio::test]
    async fn file_downloader_decodes_data_urls_and_avoids_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileDownloader::new(dir.path(), reqwest::Client::new());
        let url = data_url::encode(b"\x89PNG fake", "image/png");

        let first = sink.download(&url, DOWNLOAD_FILENAME).await.unwrap();
        let second = sink.download(&url, DOWNLOAD_FILENAME).await.unwrap();

        assert_eq!(first, dir.path().join("ai_edited_image.png"));
        assert_eq!(second, dir.path().join("ai_edited_image (1).png"));
        assert_eq!(std::fs::read(&second).unwrap(), b"\x89PNG fake");
    }

    #[tokio::test]
    async fn broken_data_url_fails_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let session = new_shared_session();
        {
            let mut st = lock_session(&session);
            st.generation.result = Some(GenerationResult {
                url: "data:image/png;base64,@@@".into(),
            });
            st.generation.result_visible = true;
        }
        let board = Arc::new(NoticeBoard::new());
        let actions = OutputActions::new(
            session,
            Arc::new(FileDownloader::new(dir.path(), reqwest::Client::new())),
            board.clone(),
        );

        assert_eq!(actions.save_individual().await, SaveOutcome::Failed);
        assert_eq!(board.messages(), vec![messages::SAVE_FAILED.to_string()]);
    }

    #[test]
    fn unique_path_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("result"), b"x").unwrap();
        assert_eq!(unique_path(dir.path(), "result"), dir.path().join("result (1)"));
    }
}
