//! Cover art fallback chain.
//!
//! Every candidate is normalized (`{size}` filled in, https forced) and
//! must live on a catalog image host to be accepted. Only the caller's
//! override and the final avatar fallback skip the host check.

use std::sync::LazyLock;

use log::{debug, info, warn};
use regex::Regex;

use crate::{
    domain::{
        hash::AlbumId,
        track::{CoverSource, ResolvedCover, SourceRecord},
    },
    http::{FetchRequest, Fetcher},
    resolve::Resolver,
};

static OG_IMAGE_PROPERTY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]*?(?:property|name)\s*=\s*["']og:image["'][^>]*?content\s*=\s*["']([^"']+)["']"#,
    )
    .unwrap()
});
static OG_IMAGE_CONTENT_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]*?content\s*=\s*["']([^"']+)["'][^>]*?(?:property|name)\s*=\s*["']og:image["']"#,
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverStep {
    /// Structured cover fields of the album data record
    AlbumDataFields,
    /// Preview image of the desktop track page
    TrackPage,
    /// Preview image of the mobile track page
    MobileTrackPage,
    /// Preview image of the album page, desktop then mobile
    AlbumPages,
    /// Singer avatar from play info
    Avatar,
}

pub const COVER_CHAIN: [CoverStep; 5] = [
    CoverStep::AlbumDataFields,
    CoverStep::TrackPage,
    CoverStep::MobileTrackPage,
    CoverStep::AlbumPages,
    CoverStep::Avatar,
];

/// Everything the chain may look at
#[derive(Debug, Clone, Copy)]
pub struct CoverContext<'a> {
    /// Parsed input link
    pub page_url: &'a str,
    /// Track page markup already fetched while extracting
    pub track_page: Option<&'a str>,
    pub album_id: Option<&'a AlbumId>,
    pub play_info: &'a SourceRecord,
    pub album_data: Option<&'a SourceRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverCandidate {
    pub url: String,
    pub source: CoverSource,
    pub valid: bool,
}

impl CoverCandidate {
    fn accept(self) -> Option<ResolvedCover> {
        if self.valid {
            Some(ResolvedCover {
                url: self.url,
                source: self.source,
            })
        } else {
            debug!("Rejected cover {} from {}: not a catalog image host", self.url, self.source);
            None
        }
    }
}

impl<F: Fetcher> Resolver<F> {
    /// Picks one cover URL. `None` means no usable artwork, which is not an error.
    pub fn resolve_cover(
        &self,
        context: &CoverContext<'_>,
        cover_override: Option<&str>,
    ) -> Option<ResolvedCover> {
        if let Some(url) = cover_override.map(str::trim).filter(|url| !url.is_empty()) {
            return Some(ResolvedCover {
                url: self.catalog.normalize_image_url(url),
                source: CoverSource::Override,
            });
        }

        for step in COVER_CHAIN {
            if let Some(cover) = self.cover_step(step, context) {
                if cover.source == CoverSource::Avatar {
                    warn!("No album cover found, falling back to singer avatar {}", cover.url);
                } else {
                    info!("Cover from {}: {}", cover.source, cover.url);
                }
                return Some(cover);
            }
            debug!("Cover step {step:?} produced nothing");
        }

        warn!("No cover art found, the file will have no artwork");
        None
    }

    fn cover_step(&self, step: CoverStep, context: &CoverContext<'_>) -> Option<ResolvedCover> {
        match step {
            CoverStep::AlbumDataFields => context
                .album_data?
                .cover_fields
                .iter()
                .find_map(|field| {
                    self.candidate(&field.url, CoverSource::AlbumData(field.name))
                        .accept()
                }),
            CoverStep::TrackPage => {
                if !self.catalog.is_track_page(context.page_url) {
                    return None;
                }
                match context.track_page {
                    Some(html) => self.markup_cover(html, CoverSource::TrackPage),
                    None => self.page_cover(self.desktop_page(context.page_url), CoverSource::TrackPage),
                }
            }
            CoverStep::MobileTrackPage => {
                let token = self.catalog.track_page_token(context.page_url)?;
                let url = self.catalog.mobile_track_page_url(&token);
                self.page_cover(self.mobile_page(&url), CoverSource::MobileTrackPage)
            }
            CoverStep::AlbumPages => {
                let album_id = context.album_id?;
                let desktop = self.catalog.album_page_url(album_id);
                let mobile = self.catalog.mobile_album_page_url(album_id);
                self.page_cover(self.desktop_page(&desktop), CoverSource::AlbumPage)
                    .or_else(|| self.page_cover(self.mobile_page(&mobile), CoverSource::MobileAlbumPage))
            }
            CoverStep::Avatar => {
                let avatar = context.play_info.avatar_url.as_deref()?;
                Some(ResolvedCover {
                    url: self.catalog.normalize_image_url(avatar),
                    source: CoverSource::Avatar,
                })
            }
        }
    }

    fn candidate(&self, raw_url: &str, source: CoverSource) -> CoverCandidate {
        let url = self.catalog.normalize_image_url(raw_url);
        let valid = self.catalog.is_image_host(&url);
        CoverCandidate { url, source, valid }
    }

    fn page_cover(&self, request: FetchRequest, source: CoverSource) -> Option<ResolvedCover> {
        let html = match self.fetcher.fetch_text(&request) {
            Ok(html) => html,
            Err(e) => {
                debug!("Could not load {} for cover art: {e}", request.url);
                return None;
            }
        };
        self.markup_cover(&html, source)
    }

    fn markup_cover(&self, html: &str, source: CoverSource) -> Option<ResolvedCover> {
        let raw_url = og_image(html)?;
        self.candidate(&raw_url, source).accept()
    }
}

/// Content of the page's `og:image` meta tag
pub fn og_image(html: &str) -> Option<String> {
    let captures = OG_IMAGE_PROPERTY_FIRST
        .captures(html)
        .or_else(|| OG_IMAGE_CONTENT_FIRST.captures(html))?;
    let url = captures.get(1)?.as_str().trim().replace("&amp;", "&");
    (!url.is_empty()).then_some(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::track::{CoverField, SourceTag},
        http::{MockFetcher, error::TransportError},
        resolve::tests::resolver,
    };

    const TRACK_PAGE: &str = "https://www.kugou.com/mixsong/8ch5ya1.html";

    fn page_with_image(url: &str) -> String {
        format!(r#"<html><head><meta property="og:image" content="{url}"/></head></html>"#)
    }

    fn play_info() -> SourceRecord {
        SourceRecord {
            stream_url: Some("https://webfs.kugou.com/a.mp3".to_string()),
            avatar_url: Some("http://singerimg.kugou.com/uploadpic/{size}/avatar.jpg".to_string()),
            ..SourceRecord::empty(SourceTag::PlayInfo)
        }
    }

    fn album_data(fields: Vec<CoverField>) -> SourceRecord {
        SourceRecord {
            cover_fields: fields,
            ..SourceRecord::empty(SourceTag::AlbumData)
        }
    }

    fn not_found(request: &FetchRequest) -> Result<String, TransportError> {
        Err(TransportError::Status {
            url: request.url.clone(),
            status: 404,
        })
    }

    #[test]
    fn og_image_in_either_attribute_order() {
        assert_eq!(
            og_image(&page_with_image("https://imge.kugou.com/a.jpg?x=1&amp;y=2")),
            Some("https://imge.kugou.com/a.jpg?x=1&y=2".to_string())
        );
        assert_eq!(
            og_image(r#"<meta content='https://imge.kugou.com/b.jpg' name='og:image'>"#),
            Some("https://imge.kugou.com/b.jpg".to_string())
        );
        assert_eq!(
            og_image(r#"<meta property="og:image:width" content="400">"#),
            None
        );
    }

    #[test]
    fn override_skips_the_chain() {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch_text().never();
        let resolver = resolver(fetcher);
        let play_info = play_info();
        let context = CoverContext {
            page_url: TRACK_PAGE,
            track_page: None,
            album_id: None,
            play_info: &play_info,
            album_data: None,
        };

        let cover = resolver
            .resolve_cover(&context, Some("http://img.example/a.jpg"))
            .unwrap();

        assert_eq!(cover.url, "https://img.example/a.jpg");
        assert_eq!(cover.source, CoverSource::Override);
    }

    #[test]
    fn valid_album_data_field_short_circuits() {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch_text().never();
        let resolver = resolver(fetcher);
        let play_info = play_info();
        let album_id = AlbumId::new("42").unwrap();
        let album_data = album_data(vec![CoverField {
            name: "album_img",
            url: "http://imge.kugou.com/stdmusic/{size}/album.jpg".to_string(),
        }]);
        let context = CoverContext {
            page_url: TRACK_PAGE,
            track_page: None,
            album_id: Some(&album_id),
            play_info: &play_info,
            album_data: Some(&album_data),
        };

        let cover = resolver.resolve_cover(&context, None).unwrap();

        assert_eq!(cover.url, "https://imge.kugou.com/stdmusic/400/album.jpg");
        assert_eq!(cover.source, CoverSource::AlbumData("album_img"));
    }

    #[test]
    fn foreign_album_data_field_is_skipped_for_next_field() {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch_text().never();
        let resolver = resolver(fetcher);
        let play_info = play_info();
        let album_data = album_data(vec![
            CoverField {
                name: "album_img",
                url: "https://avatars.example.net/default.png".to_string(),
            },
            CoverField {
                name: "img",
                url: "https://imge.kugou.com/stdmusic/400/img.jpg".to_string(),
            },
        ]);
        let context = CoverContext {
            page_url: TRACK_PAGE,
            track_page: None,
            album_id: None,
            play_info: &play_info,
            album_data: Some(&album_data),
        };

        let cover = resolver.resolve_cover(&context, None).unwrap();

        assert_eq!(cover.source, CoverSource::AlbumData("img"));
    }

    #[test]
    fn track_page_image_when_album_data_missing() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch_text()
            .withf(|req| req.url == TRACK_PAGE)
            .times(1)
            .returning(|_| Ok(page_with_image("//imge.kugou.com/stdmusic/{size}/page.jpg")));
        let resolver = resolver(fetcher);
        let play_info = play_info();
        let context = CoverContext {
            page_url: TRACK_PAGE,
            track_page: None,
            album_id: None,
            play_info: &play_info,
            album_data: None,
        };

        let cover = resolver.resolve_cover(&context, None).unwrap();

        assert_eq!(cover.url, "https://imge.kugou.com/stdmusic/400/page.jpg");
        assert_eq!(cover.source, CoverSource::TrackPage);
    }

    #[test]
    fn scraped_track_page_is_not_fetched_again() {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch_text().never();
        let resolver = resolver(fetcher);
        let play_info = play_info();
        let html = page_with_image("https://imge.kugou.com/stdmusic/{size}/page.jpg");
        let context = CoverContext {
            page_url: TRACK_PAGE,
            track_page: Some(&html),
            album_id: None,
            play_info: &play_info,
            album_data: None,
        };

        let cover = resolver.resolve_cover(&context, None).unwrap();

        assert_eq!(cover.url, "https://imge.kugou.com/stdmusic/400/page.jpg");
        assert_eq!(cover.source, CoverSource::TrackPage);
    }

    #[test]
    fn scraped_track_page_without_image_goes_to_mobile_page() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch_text()
            .withf(|req| req.url == "https://m.kugou.com/mixsong/8ch5ya1.html")
            .times(1)
            .returning(|_| Ok(page_with_image("https://imge.kugou.com/m.jpg")));
        let resolver = resolver(fetcher);
        let play_info = play_info();
        let context = CoverContext {
            page_url: TRACK_PAGE,
            track_page: Some("<html></html>"),
            album_id: None,
            play_info: &play_info,
            album_data: None,
        };

        let cover = resolver.resolve_cover(&context, None).unwrap();

        assert_eq!(cover.source, CoverSource::MobileTrackPage);
    }

    #[test]
    fn blocked_desktop_page_falls_back_to_mobile_page() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch_text()
            .withf(|req| req.url == TRACK_PAGE)
            .times(1)
            .returning(not_found);
        fetcher
            .expect_fetch_text()
            .withf(|req| req.url == "https://m.kugou.com/mixsong/8ch5ya1.html")
            .times(1)
            .returning(|_| Ok(page_with_image("https://imge.kugou.com/m.jpg")));
        let resolver = resolver(fetcher);
        let play_info = play_info();
        let context = CoverContext {
            page_url: TRACK_PAGE,
            track_page: None,
            album_id: None,
            play_info: &play_info,
            album_data: None,
        };

        let cover = resolver.resolve_cover(&context, None).unwrap();

        assert_eq!(cover.source, CoverSource::MobileTrackPage);
    }

    #[test]
    fn album_pages_tried_desktop_then_mobile() {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch_text()
            .withf(|req| req.url == "https://www.kugou.com/album/42.html")
            .times(1)
            .returning(|_| Ok(page_with_image("https://singerimg.example.org/avatar.jpg")));
        fetcher
            .expect_fetch_text()
            .withf(|req| req.url == "https://m.kugou.com/album/info/42")
            .times(1)
            .returning(|_| Ok(page_with_image("https://imge.kugou.com/album.jpg")));
        let resolver = resolver(fetcher);
        let play_info = play_info();
        let album_id = AlbumId::new("42").unwrap();
        let context = CoverContext {
            page_url: "https://www.kugou.com/song/#hash=AB&album_id=42",
            track_page: None,
            album_id: Some(&album_id),
            play_info: &play_info,
            album_data: None,
        };

        let cover = resolver.resolve_cover(&context, None).unwrap();

        assert_eq!(cover.url, "https://imge.kugou.com/album.jpg");
        assert_eq!(cover.source, CoverSource::MobileAlbumPage);
    }

    #[test]
    fn avatar_is_accepted_unchecked_as_last_resort() {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch_text().times(2).returning(not_found);
        let resolver = resolver(fetcher);
        let play_info = SourceRecord {
            avatar_url: Some("http://avatars.example.net/{size}/me.jpg".to_string()),
            ..play_info()
        };
        let context = CoverContext {
            page_url: TRACK_PAGE,
            track_page: None,
            album_id: None,
            play_info: &play_info,
            album_data: None,
        };

        let cover = resolver.resolve_cover(&context, None).unwrap();

        assert_eq!(cover.url, "https://avatars.example.net/400/me.jpg");
        assert_eq!(cover.source, CoverSource::Avatar);
    }

    #[test]
    fn nothing_found_is_none() {
        let mut fetcher = MockFetcher::new();
        fetcher.expect_fetch_text().never();
        let resolver = resolver(fetcher);
        let play_info = SourceRecord {
            avatar_url: None,
            ..play_info()
        };
        let context = CoverContext {
            page_url: "https://service.example/song#hash=AB",
            track_page: None,
            album_id: None,
            play_info: &play_info,
            album_data: None,
        };

        assert_eq!(resolver.resolve_cover(&context, None), None);
    }
}
