use log::{debug, info, warn};

use crate::comments::{CommentCollector, DEFAULT_THRESHOLD};
use crate::service::{HtmlFetcher, MetadataService};
use crate::transcript::{TranscriptResolver, TranscriptSource, WatchPageSource, placeholder};
use crate::{Comment, Error, OutputMode, Result, ResultRecord, duration, extract_video_id};

/// What to extract and how
#[derive(Debug, Clone)]
pub struct Request {
    pub mode: OutputMode,
    /// Maximum number of comments to return
    pub length: usize,
    /// Fetch every reply for threads with more than a handful
    pub expand_replies: bool,
    /// Fill the full record's comments; without it they stay empty
    pub include_comments: bool,
    /// Requested caption language; track selection currently ignores it
    pub lang: String,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            mode: OutputMode::Full,
            length: DEFAULT_THRESHOLD,
            expand_replies: false,
            include_comments: false,
            lang: "en".to_string(),
        }
    }
}

impl Request {
    /// Comments are fetched for the comments projection, and for the full
    /// record only when asked for
    pub fn wants_comments(&self) -> bool {
        match self.mode {
            OutputMode::Comments => true,
            OutputMode::Full => self.include_comments,
            OutputMode::Duration | OutputMode::Transcript => false,
        }
    }
}

/// The projection of a [`ResultRecord`] selected by [`OutputMode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Duration(u64),
    Transcript(String),
    Comments(Vec<Comment>),
    Full(ResultRecord),
}

/// Runs the full extraction for one video
pub struct Extractor<'a> {
    service: &'a dyn MetadataService,
    fetcher: &'a dyn HtmlFetcher,
    source: Option<&'a dyn TranscriptSource>,
}

impl<'a> Extractor<'a> {
    pub fn new(service: &'a dyn MetadataService, fetcher: &'a dyn HtmlFetcher) -> Self {
        Self {
            service,
            fetcher,
            source: None,
        }
    }

    /// Use a different caption track source than the watch page scraper
    pub fn with_transcript_source(mut self, source: &'a dyn TranscriptSource) -> Self {
        self.source = Some(source);
        self
    }

    pub async fn run(&self, url: &str, request: &Request) -> Result<Output> {
        let video_id = extract_video_id(url).ok_or_else(|| Error::InvalidUrl(url.to_string()))?;
        info!("Extracting {} for video {video_id}", request.mode);

        let duration = self.duration(&video_id).await?;

        let transcript = if request.mode.needs_transcript() {
            self.transcript(&video_id, &request.lang).await
        } else {
            String::new()
        };

        let comments = if request.wants_comments() {
            CommentCollector::new(self.service)
                .threshold(request.length)
                .expand_replies(request.expand_replies)
                .collect(&video_id)
                .await
        } else {
            Vec::new()
        };

        Ok(match request.mode {
            OutputMode::Duration => Output::Duration(duration),
            OutputMode::Transcript => Output::Transcript(transcript),
            OutputMode::Comments => Output::Comments(comments),
            OutputMode::Full => Output::Full(ResultRecord {
                transcript,
                duration,
                comments,
            }),
        })
    }

    async fn duration(&self, video_id: &str) -> Result<u64> {
        let iso = self.service.video_duration(video_id).await?;
        let minutes = duration::parse_minutes(&iso)?;
        debug!("Duration {iso} -> {minutes} minutes");
        Ok(minutes)
    }

    async fn transcript(&self, video_id: &str, lang: &str) -> String {
        let scraper = WatchPageSource::new(self.fetcher);
        let source: &dyn TranscriptSource = match self.source {
            Some(source) => source,
            None => &scraper,
        };
        match TranscriptResolver::new(source, self.fetcher).resolve(video_id, lang).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Transcript unavailable for {video_id}: {e}");
                placeholder(&e)
            }
        }
    }
}
