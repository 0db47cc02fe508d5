use std::fmt::Display;

/// Catalog key of a single track.
///
/// The catalog calls it a "hash": a hex token found in share links,
/// page markup and API payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackHash(String);

impl TrackHash {
    /// Keeps the token as given. Returns None for a blank token.
    pub fn new(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(Self(token.to_string()))
        }
    }

    /// Token scraped from markup, normalized to upper case
    pub fn from_scraped(token: &str) -> Option<Self> {
        Self::new(&token.to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TrackHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog key of the album a track belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlbumId(String);

impl AlbumId {
    pub fn new(id: &str) -> Option<Self> {
        let id = id.trim();
        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AlbumId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_hash_keeps_case() {
        let hash = TrackHash::new("abcDEF0011").unwrap();
        assert_eq!(hash.as_str(), "abcDEF0011");
    }

    #[test]
    fn scraped_track_hash_is_upper_cased() {
        let hash = TrackHash::from_scraped("abcdef0011").unwrap();
        assert_eq!(hash.to_string(), "ABCDEF0011");
    }

    #[test]
    fn blank_ids_are_rejected() {
        assert!(TrackHash::new("  ").is_none());
        assert!(AlbumId::new("").is_none());
    }
}
