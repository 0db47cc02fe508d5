//! Writes reconciled metadata and cover art into the downloaded file

use std::path::Path;

use lofty::config::WriteOptions;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::Accessor;
use lofty::read_from_path;
use lofty::tag::Tag;
use url::Url;

use crate::{domain::track::CanonicalMetadata, storage::error::StorageError};

const DEFAULT_COVER_MIME: &str = "image/jpeg";

/// Downloaded cover bytes
#[derive(Debug, Clone)]
pub struct CoverImage {
    pub data: Vec<u8>,
    pub mime: String,
}

/// Guesses the image MIME type from the URL path, defaulting to JPEG
pub fn cover_mime(url: &str) -> String {
    let path = Url::parse(url)
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    mime_guess::from_path(path)
        .first()
        .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_COVER_MIME.to_string())
}

fn picture_mime(mime: &str) -> MimeType {
    match mime {
        "image/png" => MimeType::Png,
        "image/jpeg" => MimeType::Jpeg,
        "image/gif" => MimeType::Gif,
        "image/bmp" => MimeType::Bmp,
        "image/tiff" => MimeType::Tiff,
        other => MimeType::Unknown(other.to_string()),
    }
}

/// Sets title, artist and album on the primary tag, replacing any front cover if one is given
pub fn embed(
    path: &Path,
    metadata: &CanonicalMetadata,
    cover: Option<CoverImage>,
) -> Result<(), StorageError> {
    let mut tagged_file = read_from_path(path)?;
    let tag_type = tagged_file.primary_tag_type();
    if tagged_file.tag(tag_type).is_none() {
        tagged_file.insert_tag(Tag::new(tag_type));
    }

    let tag = tagged_file
        .tag_mut(tag_type)
        .ok_or_else(|| StorageError::NoWritableTag(path.to_string_lossy().to_string()))?;

    tag.set_title(metadata.title.clone());
    tag.set_artist(metadata.artist.clone());
    tag.set_album(metadata.album.clone());

    if let Some(cover) = cover {
        let picture = Picture::unchecked(cover.data)
            .pic_type(PictureType::CoverFront)
            .mime_type(picture_mime(&cover.mime))
            .build();
        tag.remove_picture_type(PictureType::CoverFront);
        tag.push_picture(picture);
    }

    tagged_file.save_to_path(path, WriteOptions::default())?;
    Ok(())
}
