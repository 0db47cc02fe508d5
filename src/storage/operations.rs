use std::{
    io::Read,
    path::{Path, PathBuf},
};

use log::{info, warn};

use crate::{
    config::HttpConfig,
    domain::track::CanonicalMetadata,
    http::{Downloader, FetchRequest},
    storage::{
        error::StorageError,
        fs,
        tags::{self, CoverImage, cover_mime},
    },
};

const MAX_COVER_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug)]
pub struct SavedTrack {
    pub path: PathBuf,
    pub bytes: u64,
    /// title/artist/album were written
    pub tagged: bool,
    pub cover_embedded: bool,
}

/// Main structure that puts resolved tracks on disk
pub struct Storage<D> {
    downloader: D,
    output_dir: PathBuf,
    http: HttpConfig,
}

impl<D: Downloader> Storage<D> {
    pub fn new(downloader: D, output_dir: PathBuf, http: HttpConfig) -> Self {
        Self {
            downloader,
            output_dir,
            http,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Downloads the stream, then tags it.
    ///
    /// Only the download itself can fail; cover and tag problems are logged.
    pub fn save(&self, metadata: &CanonicalMetadata) -> Result<SavedTrack, StorageError> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = fs::track_path(&self.output_dir, metadata);

        info!("Downloading {}", path.to_string_lossy());
        let mut body = self.downloader.open(&self.request(&metadata.stream_url))?;
        let bytes = fs::write_atomically(&path, &mut body)?;

        let cover = metadata
            .cover
            .as_ref()
            .and_then(|cover| match self.fetch_cover(&cover.url) {
                Ok(image) => Some(image),
                Err(e) => {
                    warn!("Cover fetch failed: {e}");
                    None
                }
            });
        let has_cover = cover.is_some();

        let tagged = match tags::embed(&path, metadata, cover) {
            Ok(()) => true,
            Err(e) => {
                warn!("Tagging failed: {e}");
                false
            }
        };

        Ok(SavedTrack {
            path,
            bytes,
            tagged,
            cover_embedded: tagged && has_cover,
        })
    }

    fn fetch_cover(&self, url: &str) -> Result<CoverImage, StorageError> {
        let mut data = Vec::new();
        self.downloader
            .open(&self.request(url))?
            .take(MAX_COVER_BYTES)
            .read_to_end(&mut data)?;
        if data.is_empty() {
            return Err(StorageError::EmptyCover(url.to_string()));
        }
        Ok(CoverImage {
            data,
            mime: cover_mime(url),
        })
    }

    fn request(&self, url: &str) -> FetchRequest {
        FetchRequest::new(url, self.http.download_timeout()).headers(self.http.desktop.headers())
    }
}
