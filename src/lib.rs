pub mod comments;
pub mod config;
pub mod duration;
pub mod error;
pub mod extract;
pub mod output;
pub mod service;
pub mod transcript;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub use error::{Error, Result};

static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:https?://)?(?:www\.)?(?:youtube\.com/(?:[^/\n\s]+/\S+/|(?:v|e(?:mbed)?)/|\S*?[?&]v=)|youtu\.be/)([a-zA-Z0-9_-]{11})",
    )
    .expect("video id pattern is valid")
});

/// A top-level comment and the replies attached to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    #[serde(rename = "TopLevel")]
    pub top_level: String,
    #[serde(rename = "Replies")]
    pub replies: Vec<String>,
}

/// Everything extracted for a single video
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    pub transcript: String,
    pub duration: u64,
    pub comments: Vec<Comment>,
}

/// Which part of the record the caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    Duration,
    Transcript,
    Comments,
    #[default]
    Full,
}

impl OutputMode {
    pub fn needs_transcript(self) -> bool {
        matches!(self, OutputMode::Transcript | OutputMode::Full)
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::Duration => write!(f, "duration"),
            OutputMode::Transcript => write!(f, "transcript"),
            OutputMode::Comments => write!(f, "comments"),
            OutputMode::Full => write!(f, "full"),
        }
    }
}

/// Extract the 11-character video ID from a YouTube URL.
///
/// Recognizes watch, embed, `/v/`, `/e/`, youtu.be and nested channel-style
/// paths. The first match in the input wins.
pub fn extract_video_id(input: &str) -> Option<String> {
    VIDEO_ID_RE.captures(input).map(|caps| caps[1].to_string())
}
