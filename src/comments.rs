use log::{debug, warn};

use crate::Comment;
use crate::service::{CommentThread, MetadataService};

/// Default number of comments to collect
pub const DEFAULT_THRESHOLD: usize = 100;

/// Largest page the comment listing endpoint serves
const MAX_PAGE_SIZE: usize = 100;

/// Threads reporting more replies than this get a dedicated reply fetch when
/// expansion is requested
const INLINE_REPLY_LIMIT: u32 = 5;

/// Collects top-level comment threads for a video, best effort
pub struct CommentCollector<'a> {
    service: &'a dyn MetadataService,
    threshold: usize,
    expand_replies: bool,
}

impl<'a> CommentCollector<'a> {
    pub fn new(service: &'a dyn MetadataService) -> Self {
        Self {
            service,
            threshold: DEFAULT_THRESHOLD,
            expand_replies: false,
        }
    }

    pub fn threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn expand_replies(mut self, expand: bool) -> Self {
        self.expand_replies = expand;
        self
    }

    /// Page size and number of pages to attempt.
    ///
    /// Below one full page only a single page of `threshold` is requested.
    /// Otherwise one page past `threshold / 100` is attempted and the excess is
    /// truncated afterwards.
    fn plan(&self) -> (usize, usize) {
        if self.threshold < MAX_PAGE_SIZE {
            (self.threshold, 1)
        } else {
            (MAX_PAGE_SIZE, self.threshold / MAX_PAGE_SIZE + 1)
        }
    }

    /// Collect up to `threshold` comments. Failures end collection early and
    /// return what was gathered.
    pub async fn collect(&self, video_id: &str) -> Vec<Comment> {
        if self.threshold == 0 {
            return Vec::new();
        }

        let (page_size, pages) = self.plan();
        debug!("Collecting comments for {video_id}: page_size={page_size} pages={pages}");

        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 0..pages {
            let result = self
                .service
                .list_comment_threads(video_id, page_size as u32, page_token.as_deref())
                .await;

            let thread_page = match result {
                Ok(p) => p,
                Err(e) => {
                    warn!("Failed to fetch comment page {}: {e}", page + 1);
                    break;
                }
            };

            for thread in thread_page.threads {
                // Surplus threads from the over-fetched page are dropped
                // before their replies are expanded.
                if comments.len() >= self.threshold {
                    break;
                }
                let comment = self.to_comment(thread).await;
                comments.push(comment);
            }

            page_token = thread_page.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                debug!("No continuation token after page {}", page + 1);
                break;
            }
        }

        comments.truncate(self.threshold);
        comments
    }

    async fn to_comment(&self, thread: CommentThread) -> Comment {
        let replies = if self.expand_replies && thread.total_reply_count > INLINE_REPLY_LIMIT {
            debug!(
                "Expanding {} replies for thread {}",
                thread.total_reply_count, thread.id
            );
            match self.service.list_replies(&thread.id).await {
                Ok(replies) => replies,
                Err(e) => {
                    warn!("Failed to fetch replies for thread {}: {e}", thread.id);
                    Vec::new()
                }
            }
        } else {
            thread.replies
        };

        Comment {
            top_level: thread.text,
            replies,
        }
    }
}
