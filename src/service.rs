use async_trait::async_trait;

use crate::Result;

/// One top-level comment thread as returned by a listing call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentThread {
    /// Thread ID, which is also the ID of its top-level comment
    pub id: String,
    pub text: String,
    /// Reply count reported by the service, not the number inlined
    pub total_reply_count: u32,
    /// Replies inlined on the thread response
    pub replies: Vec<String>,
}

/// A page of comment threads plus the continuation token, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadPage {
    pub threads: Vec<CommentThread>,
    pub next_page_token: Option<String>,
}

/// Video metadata and comment listings
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// ISO-8601 duration string for the video
    async fn video_duration(&self, video_id: &str) -> Result<String>;

    async fn list_comment_threads(
        &self,
        video_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ThreadPage>;

    /// First page of replies to a top-level comment
    async fn list_replies(&self, parent_id: &str) -> Result<Vec<String>>;
}

/// Fetches a URL and returns the raw body
#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<String>;
}
