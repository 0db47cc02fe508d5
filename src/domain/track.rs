use std::fmt::Display;

use serde::{Serialize, Serializer};

/// Value used for any text field that no source could fill
pub const UNKNOWN: &str = "Unknown";

/// Identifies the backend that produced a [`SourceRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceTag {
    /// Free-tier mobile API, the only source of the stream URL
    PlayInfo,
    /// Desktop API keyed by track and album, richer but unreliable
    AlbumData,
}

impl Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceTag::PlayInfo => write!(f, "play_info"),
            SourceTag::AlbumData => write!(f, "album_data"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Artist,
    Album,
}

/// Cover URL taken from a named payload field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverField {
    pub name: &'static str,
    pub url: String,
}

/// Partial metadata returned by one backend.
///
/// Text fields are `None` rather than empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub source: SourceTag,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Combined "Artist - Title" label
    pub file_name: Option<String>,
    pub stream_url: Option<String>,
    /// Cover candidates in the order they should be tried
    pub cover_fields: Vec<CoverField>,
    /// Low resolution image, usually the singer's avatar
    pub avatar_url: Option<String>,
}

impl SourceRecord {
    pub fn empty(source: SourceTag) -> Self {
        Self {
            source,
            title: None,
            artist: None,
            album: None,
            file_name: None,
            stream_url: None,
            cover_fields: Vec::new(),
            avatar_url: None,
        }
    }

    pub fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Title => self.title.as_deref(),
            Field::Artist => self.artist.as_deref(),
            Field::Album => self.album.as_deref(),
        }
    }

    /// Title part of `file_name`: everything after the first " - ", or the whole label
    pub fn file_name_title(&self) -> Option<&str> {
        let file_name = self.file_name.as_deref()?;
        let title = match file_name.split_once(" - ") {
            Some((_, title)) => title.trim(),
            None => file_name.trim(),
        };
        (!title.is_empty()).then_some(title)
    }

    /// Artist part of `file_name`, only when the label has a " - " separator
    pub fn file_name_artist(&self) -> Option<&str> {
        let (artist, _) = self.file_name.as_deref()?.split_once(" - ")?;
        let artist = artist.trim();
        (!artist.is_empty()).then_some(artist)
    }
}

/// Where the chosen cover came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverSource {
    Override,
    AlbumData(&'static str),
    TrackPage,
    MobileTrackPage,
    AlbumPage,
    MobileAlbumPage,
    /// Generic singer avatar, accepted without host validation
    Avatar,
}

impl Display for CoverSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoverSource::Override => write!(f, "override"),
            CoverSource::AlbumData(field) => write!(f, "album_data:{field}"),
            CoverSource::TrackPage => write!(f, "track_page"),
            CoverSource::MobileTrackPage => write!(f, "mobile_track_page"),
            CoverSource::AlbumPage => write!(f, "album_page"),
            CoverSource::MobileAlbumPage => write!(f, "mobile_album_page"),
            CoverSource::Avatar => write!(f, "avatar"),
        }
    }
}

impl Serialize for CoverSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCover {
    pub url: String,
    pub source: CoverSource,
}

/// Reconciled metadata of one track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalMetadata {
    pub hash: String,
    pub album_id: Option<String>,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub stream_url: String,
    /// None when every cover source came up empty
    pub cover: Option<ResolvedCover>,
}
