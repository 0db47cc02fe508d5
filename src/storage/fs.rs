//! Output paths and crash-safe file writes

use std::{
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};

use url::Url;

use crate::domain::track::CanonicalMetadata;

const MUSIC_EXTENSIONS: &[&str] = &["mp3", "flac", "wav", "m4a", "ogg", "aac"];
const DEFAULT_EXTENSION: &str = "mp3";
const MAX_NAME_CHARS: usize = 200;

/// Extension of the stream URL when it names an audio format, `mp3` otherwise
pub fn audio_extension(stream_url: &str) -> &'static str {
    let ext = Url::parse(stream_url).ok().and_then(|url| {
        Path::new(url.path())
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    });
    ext.and_then(|ext| MUSIC_EXTENSIONS.iter().find(|known| **known == ext).copied())
        .unwrap_or(DEFAULT_EXTENSION)
}

/// Makes `name` usable as a file name on every common filesystem
pub fn safe_file_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
                ' '
            } else {
                c
            }
        })
        .collect();
    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_NAME_CHARS).collect::<String>().trim().to_string()
}

/// `<dir>/<Artist - Title>.<ext>`
pub fn track_path(output_dir: &Path, metadata: &CanonicalMetadata) -> PathBuf {
    let stem = safe_file_name(&format!("{} - {}", metadata.artist, metadata.title));
    output_dir.join(format!("{stem}.{}", audio_extension(&metadata.stream_url)))
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Copies `reader` into `path` through a `.part` file.
///
/// `path` only appears once the copy completed; on failure the partial file is removed.
pub fn write_atomically(path: &Path, reader: &mut dyn Read) -> io::Result<u64> {
    let part = part_path(path);
    match copy_into(&part, reader) {
        Ok(written) => {
            std::fs::rename(&part, path)?;
            Ok(written)
        }
        Err(e) => {
            let _ = std::fs::remove_file(&part);
            Err(e)
        }
    }
}

fn copy_into(path: &Path, reader: &mut dyn Read) -> io::Result<u64> {
    let mut file = File::create(path)?;
    let written = io::copy(reader, &mut file)?;
    file.sync_all()?;
    Ok(written)
}
