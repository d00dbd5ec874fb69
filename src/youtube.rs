use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::service::{CommentThread, HtmlFetcher, MetadataService, ThreadPage};
use crate::{Error, Result};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

const DATA_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    #[serde(rename = "contentDetails")]
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

#[derive(Debug, Deserialize)]
struct CommentThreadListResponse {
    #[serde(default)]
    items: Vec<CommentThreadItem>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThreadItem {
    id: String,
    snippet: ThreadSnippet,
    replies: Option<InlineReplies>,
}

#[derive(Debug, Deserialize)]
struct ThreadSnippet {
    #[serde(rename = "topLevelComment")]
    top_level_comment: CommentResource,
    #[serde(rename = "totalReplyCount", default)]
    total_reply_count: u32,
}

#[derive(Debug, Deserialize)]
struct InlineReplies {
    #[serde(default)]
    comments: Vec<CommentResource>,
}

#[derive(Debug, Deserialize)]
struct CommentListResponse {
    #[serde(default)]
    items: Vec<CommentResource>,
}

#[derive(Debug, Deserialize)]
struct CommentResource {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
struct CommentSnippet {
    #[serde(rename = "textDisplay", default)]
    text_display: String,
}

impl From<CommentThreadItem> for CommentThread {
    fn from(item: CommentThreadItem) -> Self {
        CommentThread {
            id: item.id,
            text: item.snippet.top_level_comment.snippet.text_display,
            total_reply_count: item.snippet.total_reply_count,
            replies: item
                .replies
                .map(|r| r.comments.into_iter().map(|c| c.snippet.text_display).collect())
                .unwrap_or_default(),
        }
    }
}

/// YouTube Data API v3 client authenticated with an API key
pub struct DataApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl DataApiClient {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DATA_API_BASE.to_string(),
        }
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the GET request for a Data API resource, API key appended
    fn build_request(&self, resource: &str, params: &[(&str, String)]) -> Result<reqwest::Request> {
        let url = format!("{}/{resource}", self.base_url);
        let request = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .build()?;
        Ok(request)
    }

    async fn get_json<T: DeserializeOwned>(&self, resource: &str, params: &[(&str, String)]) -> Result<T> {
        let request = self.build_request(resource, params)?;
        debug!("GET {resource} {params:?}");

        let resp = self.client.execute(request).await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api { status, body });
        }

        Ok(resp.json().await?)
    }
}

fn video_params(video_id: &str) -> Vec<(&'static str, String)> {
    vec![("part", "contentDetails".to_string()), ("id", video_id.to_string())]
}

fn comment_thread_params(video_id: &str, page_size: u32, page_token: Option<&str>) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("part", "snippet,replies".to_string()),
        ("videoId", video_id.to_string()),
        ("textFormat", "plainText".to_string()),
        ("maxResults", page_size.to_string()),
    ];
    if let Some(token) = page_token {
        params.push(("pageToken", token.to_string()));
    }
    params
}

fn reply_params(parent_id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("part", "snippet".to_string()),
        ("parentId", parent_id.to_string()),
        ("textFormat", "plainText".to_string()),
        ("maxResults", "100".to_string()),
    ]
}

#[async_trait]
impl MetadataService for DataApiClient {
    async fn video_duration(&self, video_id: &str) -> Result<String> {
        let resp: VideoListResponse = self.get_json("videos", &video_params(video_id)).await?;

        resp.items
            .into_iter()
            .next()
            .map(|item| item.content_details.duration)
            .ok_or_else(|| Error::VideoNotFound(video_id.to_string()))
    }

    async fn list_comment_threads(
        &self,
        video_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ThreadPage> {
        let params = comment_thread_params(video_id, page_size, page_token);
        let resp: CommentThreadListResponse = self.get_json("commentThreads", &params).await?;
        Ok(ThreadPage {
            threads: resp.items.into_iter().map(CommentThread::from).collect(),
            next_page_token: resp.next_page_token,
        })
    }

    async fn list_replies(&self, parent_id: &str) -> Result<Vec<String>> {
        let resp: CommentListResponse = self.get_json("comments", &reply_params(parent_id)).await?;
        Ok(resp.items.into_iter().map(|c| c.snippet.text_display).collect())
    }
}

/// Plain HTTP GET with a desktop browser User-Agent
pub struct WebFetcher {
    client: reqwest::Client,
}

impl WebFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HtmlFetcher for WebFetcher {
    async fn get(&self, url: &str) -> Result<String> {
        debug!("Fetching {url}");
        let body = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}
