use anyhow::Context;
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 15_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.0 Mobile/15E148 Safari/604.1";

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub output_dir: OutputDir,
    pub http: HttpConfig,
    pub catalog: CatalogConfig,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }
}

/// Directory where finished tracks are written
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OutputDir(pub PathBuf);

impl Default for OutputDir {
    fn default() -> Self {
        Self(PathBuf::from("."))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub api_timeout_secs: u64,
    pub page_timeout_secs: u64,
    pub download_timeout_secs: u64,
    pub desktop: HeaderProfile,
    pub mobile: HeaderProfile,
}

impl HttpConfig {
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            api_timeout_secs: 15,
            page_timeout_secs: 15,
            download_timeout_secs: 25,
            desktop: HeaderProfile {
                user_agent: DESKTOP_USER_AGENT.to_string(),
                referer: "https://www.kugou.com/".to_string(),
            },
            mobile: HeaderProfile {
                user_agent: MOBILE_USER_AGENT.to_string(),
                referer: "https://m.kugou.com/".to_string(),
            },
        }
    }
}

/// Headers sent to pretend being a particular kind of browser
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HeaderProfile {
    pub user_agent: String,
    pub referer: String,
}

impl HeaderProfile {
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("User-Agent".to_string(), self.user_agent.clone()),
            ("Referer".to_string(), self.referer.clone()),
        ]
    }
}

/// Endpoint templates of the music catalog.
///
/// Templates use `{hash}`, `{album_id}` and `{token}` placeholders.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    pub play_info_api: String,
    pub album_data_api: String,
    /// Regex recognizing a canonical track page; capture group 1 is the page token
    pub track_page_pattern: String,
    pub mobile_track_page: String,
    pub album_page: String,
    pub mobile_album_page: String,
    pub image_hosts: Vec<String>,
    pub cover_size: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            play_info_api: "https://m.kugou.com/app/i/getSongInfo.php?cmd=playInfo&hash={hash}"
                .to_string(),
            album_data_api:
                "https://wwwapi.kugou.com/yy/index.php?r=play/getdata&hash={hash}&album_id={album_id}"
                    .to_string(),
            track_page_pattern: r"^https?://(?:www\.)?kugou\.com/mixsong/([0-9A-Za-z]+)\.html"
                .to_string(),
            mobile_track_page: "https://m.kugou.com/mixsong/{token}.html".to_string(),
            album_page: "https://www.kugou.com/album/{album_id}.html".to_string(),
            mobile_album_page: "https://m.kugou.com/album/info/{album_id}".to_string(),
            image_hosts: vec!["kugou.com".to_string()],
            cover_size: "400".to_string(),
        }
    }
}
