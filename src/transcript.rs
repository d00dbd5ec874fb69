use std::sync::LazyLock;

use async_trait::async_trait;
use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;

use crate::service::HtmlFetcher;
use crate::{Error, Result};

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>(.*?)</script>").expect("script pattern is valid"));

static CAPTION_TRACKS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)"captionTracks":(\[.*?\])"#).expect("captionTracks pattern is valid"));

/// A caption track advertised on the watch page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    pub base_url: String,
}

/// Where caption tracks for a video come from
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Caption tracks in document order. Never returns an empty list.
    async fn caption_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>>;
}

/// Scrapes caption tracks out of the inline scripts on the watch page
pub struct WatchPageSource<'a> {
    fetcher: &'a dyn HtmlFetcher,
}

impl<'a> WatchPageSource<'a> {
    pub fn new(fetcher: &'a dyn HtmlFetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl<'a> TranscriptSource for WatchPageSource<'a> {
    async fn caption_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>> {
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        debug!("Fetching watch page: {watch_url}");

        let page_html = self.fetcher.get(&watch_url).await?;
        let tracks = find_caption_tracks(&page_html);
        if tracks.is_empty() {
            return Err(Error::TranscriptNotFound(format!("no caption tracks on watch page for {video_id}")));
        }
        Ok(tracks)
    }
}

/// Resolves a video's transcript to flat text
pub struct TranscriptResolver<'a> {
    source: &'a dyn TranscriptSource,
    fetcher: &'a dyn HtmlFetcher,
}

impl<'a> TranscriptResolver<'a> {
    pub fn new(source: &'a dyn TranscriptSource, fetcher: &'a dyn HtmlFetcher) -> Self {
        Self { source, fetcher }
    }

    /// Fetch the first caption track and flatten its segments.
    ///
    /// `lang` is recorded but does not influence track selection. Every
    /// failure is reported as [`Error::TranscriptNotFound`].
    pub async fn resolve(&self, video_id: &str, lang: &str) -> Result<String> {
        self.resolve_inner(video_id, lang).await.map_err(|e| match e {
            Error::TranscriptNotFound(_) => e,
            other => Error::TranscriptNotFound(other.to_string()),
        })
    }

    async fn resolve_inner(&self, video_id: &str, lang: &str) -> Result<String> {
        let tracks = self.source.caption_tracks(video_id).await?;
        let track = tracks
            .first()
            .ok_or_else(|| Error::TranscriptNotFound(format!("no caption tracks for {video_id}")))?;
        debug!("Using first of {} caption tracks (requested lang={lang})", tracks.len());

        let payload = self.fetcher.get(&track.base_url).await?;
        let segments = parse_timed_text(&payload)?;
        debug!("Parsed {} transcript segments", segments.len());
        Ok(segments.join(" "))
    }
}

/// Text to show in place of a transcript that could not be resolved
pub fn placeholder(err: &Error) -> String {
    format!("Transcript not available. ({err})")
}

/// Find the first inline script carrying a non-empty `captionTracks` array.
fn find_caption_tracks(html: &str) -> Vec<CaptionTrack> {
    for script in SCRIPT_RE.captures_iter(html) {
        let body = &script[1];
        if !body.contains("captionTracks") {
            continue;
        }
        let Some(caps) = CAPTION_TRACKS_RE.captures(body) else {
            continue;
        };
        match serde_json::from_str::<Vec<CaptionTrack>>(&caps[1]) {
            Ok(tracks) if !tracks.is_empty() => return tracks,
            Ok(_) => debug!("Empty captionTracks array, continuing scan"),
            Err(e) => warn!("Could not decode captionTracks array: {e}"),
        }
    }
    Vec::new()
}

/// Extract the content of every `<text>` element, in document order.
fn parse_timed_text(xml: &str) -> Result<Vec<String>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                current = Some(String::new());
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"text" => {
                segments.push(String::new());
            }
            Ok(Event::Text(ref e)) => {
                if let Some(buf) = current.as_mut() {
                    let raw_text = match e.unescape() {
                        Ok(text) => text,
                        Err(err) => {
                            debug!("Keeping escaped segment text: {err}");
                            String::from_utf8_lossy(e)
                        }
                    };
                    buf.push_str(&html_escape::decode_html_entities(&raw_text));
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                if let Some(text) = current.take() {
                    segments.push(text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::TranscriptNotFound(format!("error parsing timed text: {e}"))),
            _ => {}
        }
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct FakeFetcher {
        pages: HashMap<String, String>,
    }

    impl FakeFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            }
        }
    }

    #[async_trait]
    impl HtmlFetcher for FakeFetcher {
        async fn get(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| Error::Api { status: 404, body: url.to_string() })
        }
    }

    const WATCH_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
    const TRACK_URL: &str = "https://www.youtube.com/api/timedtext?v=dQw4w9WgXcQ&lang=en";

    fn watch_page() -> String {
        format!(
            r#"<html><head><script>var ytcfg = {{}};</script>
<script nonce="abc">var ytInitialPlayerResponse = {{"captions":{{"playerCaptionsTracklistRenderer":{{"captionTracks":[{{"baseUrl":"{}","languageCode":"en"}},{{"baseUrl":"https://example.com/de","languageCode":"de"}}],"audioTracks":[]}}}}}};</script>
</head><body></body></html>"#,
            TRACK_URL.replace('&', "\\u0026")
        )
    }

    const TIMED_TEXT: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<transcript>
    <text start="0.21" dur="2.34">Hello world</text>
    <text start="2.55" dur="1.50">This is a test</text>
</transcript>"#;

    #[test]
    fn test_find_caption_tracks_first_in_document_order() {
        let tracks = find_caption_tracks(&watch_page());
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].base_url, TRACK_URL);
    }

    #[test]
    fn test_find_caption_tracks_skips_empty_arrays() {
        let html = r#"<script>{"captionTracks":[]}</script><script>{"captionTracks":[{"baseUrl":"u2"}]}</script>"#;
        let tracks = find_caption_tracks(html);
        assert_eq!(tracks, vec![CaptionTrack { base_url: "u2".to_string() }]);
    }

    #[test]
    fn test_find_caption_tracks_missing_marker() {
        let html = "<html><script>var x = 1;</script><body>captionTracks outside script</body></html>";
        assert!(find_caption_tracks(html).is_empty());
    }

    #[test]
    fn test_parse_timed_text_basic() {
        let segments = parse_timed_text(TIMED_TEXT).unwrap();
        assert_eq!(segments, vec!["Hello world", "This is a test"]);
    }

    #[test]
    fn test_parse_timed_text_html_entities() {
        let xml = r#"<transcript><text start="0.0" dur="1.0">it&amp;#39;s a &amp;quot;test&amp;quot;</text></transcript>"#;
        let segments = parse_timed_text(xml).unwrap();
        assert_eq!(segments, vec!["it's a \"test\""]);
    }

    #[test]
    fn test_parse_timed_text_keeps_unknown_entities() {
        let xml = "<transcript><text>a &foo; b</text><text>c</text></transcript>";
        assert_eq!(parse_timed_text(xml).unwrap(), vec!["a &foo; b", "c"]);
    }

    #[test]
    fn test_parse_timed_text_malformed() {
        let err = parse_timed_text("<transcript><text>a</transcript>").unwrap_err();
        assert!(matches!(err, Error::TranscriptNotFound(_)));
    }

    #[test]
    fn test_find_caption_tracks_skips_undecodable_arrays() {
        let html = r#"<script>{"captionTracks":[{"nope":1}]}</script><script>{"captionTracks":[{"baseUrl":"u2"}]}</script>"#;
        let tracks = find_caption_tracks(html);
        assert_eq!(tracks, vec![CaptionTrack { base_url: "u2".to_string() }]);
    }

    #[test]
    fn test_parse_timed_text_empty() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript></transcript>"#;
        assert!(parse_timed_text(xml).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_joins_with_single_space() {
        let page = watch_page();
        let fetcher = FakeFetcher::new(&[(WATCH_URL, page.as_str()), (TRACK_URL, TIMED_TEXT)]);
        let source = WatchPageSource::new(&fetcher);
        let resolver = TranscriptResolver::new(&source, &fetcher);

        let text = resolver.resolve("dQw4w9WgXcQ", "en").await.unwrap();
        assert_eq!(text, "Hello world This is a test");
    }

    #[tokio::test]
    async fn test_resolve_ignores_lang() {
        let page = watch_page();
        let fetcher = FakeFetcher::new(&[(WATCH_URL, page.as_str()), (TRACK_URL, TIMED_TEXT)]);
        let source = WatchPageSource::new(&fetcher);
        let resolver = TranscriptResolver::new(&source, &fetcher);

        let text = resolver.resolve("dQw4w9WgXcQ", "de").await.unwrap();
        assert_eq!(text, "Hello world This is a test");
    }

    #[tokio::test]
    async fn test_resolve_without_tracks() {
        let fetcher = FakeFetcher::new(&[(WATCH_URL, "<html><script>var a = 1;</script></html>")]);
        let source = WatchPageSource::new(&fetcher);
        let resolver = TranscriptResolver::new(&source, &fetcher);

        let err = resolver.resolve("dQw4w9WgXcQ", "en").await.unwrap_err();
        assert!(matches!(err, Error::TranscriptNotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_fetch_failure_is_not_found() {
        let fetcher = FakeFetcher::new(&[]);
        let source = WatchPageSource::new(&fetcher);
        let resolver = TranscriptResolver::new(&source, &fetcher);

        let err = resolver.resolve("dQw4w9WgXcQ", "en").await.unwrap_err();
        assert!(matches!(err, Error::TranscriptNotFound(_)));
        assert!(placeholder(&err).starts_with("Transcript not available. (transcript not found:"));
    }

    #[tokio::test]
    async fn test_resolve_track_fetch_failure() {
        let page = watch_page();
        let fetcher = FakeFetcher::new(&[(WATCH_URL, page.as_str())]);
        let source = WatchPageSource::new(&fetcher);
        let resolver = TranscriptResolver::new(&source, &fetcher);

        let err = resolver.resolve("dQw4w9WgXcQ", "en").await.unwrap_err();
        assert!(matches!(err, Error::TranscriptNotFound(_)));
    }

    struct FixedSource(Vec<CaptionTrack>);

    #[async_trait]
    impl TranscriptSource for FixedSource {
        async fn caption_tracks(&self, _video_id: &str) -> Result<Vec<CaptionTrack>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_resolver_with_swapped_source() {
        let fetcher = FakeFetcher::new(&[("https://captions.test/a", "<t><text>a</text><text>b</text><text>c</text></t>")]);
        let source = FixedSource(vec![
            CaptionTrack { base_url: "https://captions.test/a".to_string() },
            CaptionTrack { base_url: "https://captions.test/b".to_string() },
        ]);
        let resolver = TranscriptResolver::new(&source, &fetcher);

        assert_eq!(resolver.resolve("dQw4w9WgXcQ", "en").await.unwrap(), "a b c");
    }

    #[tokio::test]
    async fn test_resolver_empty_source_is_not_found() {
        let fetcher = FakeFetcher::new(&[]);
        let source = FixedSource(Vec::new());
        let resolver = TranscriptResolver::new(&source, &fetcher);

        let err = resolver.resolve("dQw4w9WgXcQ", "en").await.unwrap_err();
        assert!(matches!(err, Error::TranscriptNotFound(_)));
    }
}
