//! Adapters for the two catalog APIs

use log::debug;
use serde_json::Value;

use crate::{
    domain::{
        hash::{AlbumId, TrackHash},
        track::{CoverField, SourceRecord, SourceTag},
    },
    http::Fetcher,
    resolve::{
        Resolver,
        error::{SourceError, SourceFailure},
    },
};

/// Cover fields of the album data payload, best first: (label, JSON path)
const ALBUM_DATA_COVER_FIELDS: &[(&str, &[&str])] = &[
    ("album_img", &["album_img"]),
    ("trans_param.union_cover", &["trans_param", "union_cover"]),
    ("img", &["img"]),
];

impl<F: Fetcher> Resolver<F> {
    /// Queries the free-tier play info API. A record from here always has a stream URL.
    pub fn fetch_play_info(&self, hash: &TrackHash) -> Result<SourceRecord, SourceError> {
        let request = self.mobile_api(&self.catalog.play_info_url(hash));
        let payload = self
            .fetcher
            .fetch_json(&request)
            .map_err(|e| SourceError::new(SourceTag::PlayInfo, e))?;
        parse_play_info(&payload).map_err(|e| SourceError::new(SourceTag::PlayInfo, e))
    }

    /// Queries the album data API, which needs both identifiers
    pub fn fetch_album_data(
        &self,
        hash: &TrackHash,
        album_id: &AlbumId,
    ) -> Result<SourceRecord, SourceError> {
        let request = self.desktop_api(&self.catalog.album_data_url(hash, album_id));
        let payload = self
            .fetcher
            .fetch_json(&request)
            .map_err(|e| SourceError::new(SourceTag::AlbumData, e))?;
        parse_album_data(&payload).map_err(|e| SourceError::new(SourceTag::AlbumData, e))
    }
}

pub fn parse_play_info(payload: &Value) -> Result<SourceRecord, SourceFailure> {
    if !payload.is_object() {
        return Err(SourceFailure::Malformed(format!(
            "expected an object, got {payload}"
        )));
    }

    let Some(stream_url) = text(payload, &["url"]) else {
        let reason = text(payload, &["error"])
            .unwrap_or_else(|| "no free stream URL (VIP only or region locked)".to_string());
        return Err(SourceFailure::Unavailable(reason));
    };

    Ok(SourceRecord {
        title: text(payload, &["songName"]),
        artist: text(payload, &["singerName"]),
        album: text(payload, &["album_name"]),
        file_name: text(payload, &["fileName"]),
        stream_url: Some(stream_url),
        avatar_url: text(payload, &["imgUrl"]),
        ..SourceRecord::empty(SourceTag::PlayInfo)
    })
}

pub fn parse_album_data(payload: &Value) -> Result<SourceRecord, SourceFailure> {
    let status = payload.get("status").and_then(|status| {
        status
            .as_i64()
            .or_else(|| status.as_str().and_then(|s| s.parse().ok()))
    });
    let data = payload.get("data").filter(|data| data.is_object());

    let data = match (status, data) {
        (Some(1), Some(data)) => data,
        (Some(1), None) => {
            return Err(SourceFailure::Malformed("status 1 without data".to_string()));
        }
        (Some(status), _) => {
            let code = payload.get("err_code").map(Value::to_string).unwrap_or_default();
            return Err(SourceFailure::Unavailable(format!("status {status} {code}")));
        }
        (None, _) => {
            return Err(SourceFailure::Malformed(format!("no status in {payload}")));
        }
    };

    let cover_fields = ALBUM_DATA_COVER_FIELDS
        .iter()
        .filter_map(|(name, path)| text(data, path).map(|url| CoverField { name: *name, url }))
        .collect::<Vec<_>>();
    debug!("album data offers {} cover field(s)", cover_fields.len());

    Ok(SourceRecord {
        title: text(data, &["song_name"]),
        artist: text(data, &["author_name"]),
        album: text(data, &["album_name"]),
        cover_fields,
        ..SourceRecord::empty(SourceTag::AlbumData)
    })
}

/// Non-blank string at `path`
fn text(value: &Value, path: &[&str]) -> Option<String> {
    let value = path.iter().try_fold(value, |value, key| value.get(key))?;
    let text = value.as_str()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}
