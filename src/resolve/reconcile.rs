//! Field-level merge of the play info and album data records

use crate::domain::track::{Field, SourceRecord, UNKNOWN};

/// One place a field value may be taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    AlbumData(Field),
    PlayInfo(Field),
    /// Title half of the play info "Artist - Title" label
    FileNameTitle,
    /// Artist half of the play info "Artist - Title" label
    FileNameArtist,
}

pub const TITLE: &[Pick] = &[
    Pick::AlbumData(Field::Title),
    Pick::PlayInfo(Field::Title),
    Pick::FileNameTitle,
];

pub const ARTIST: &[Pick] = &[
    Pick::AlbumData(Field::Artist),
    Pick::PlayInfo(Field::Artist),
    Pick::FileNameArtist,
];

pub const ALBUM: &[Pick] = &[Pick::AlbumData(Field::Album), Pick::PlayInfo(Field::Album)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub stream_url: String,
}

/// Merges both records. `None` if play info carries no stream URL.
pub fn reconcile(play_info: &SourceRecord, album_data: Option<&SourceRecord>) -> Option<Reconciled> {
    let stream_url = play_info
        .stream_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())?
        .to_string();

    Some(Reconciled {
        title: pick(TITLE, play_info, album_data),
        artist: pick(ARTIST, play_info, album_data),
        album: pick(ALBUM, play_info, album_data),
        stream_url,
    })
}

/// First non-blank value along `rule`, or [`UNKNOWN`]
pub fn pick(rule: &[Pick], play_info: &SourceRecord, album_data: Option<&SourceRecord>) -> String {
    rule.iter()
        .find_map(|step| {
            let value = match step {
                Pick::AlbumData(field) => album_data.and_then(|record| record.field(*field)),
                Pick::PlayInfo(field) => play_info.field(*field),
                Pick::FileNameTitle => play_info.file_name_title(),
                Pick::FileNameArtist => play_info.file_name_artist(),
            };
            value.filter(|value| !value.trim().is_empty())
        })
        .unwrap_or(UNKNOWN)
        .to_string()
}
