use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not extract video ID from: {0}")]
    InvalidUrl(String),

    #[error("invalid duration string: {0}")]
    InvalidDurationFormat(String),

    #[error("transcript not found: {0}")]
    TranscriptNotFound(String),

    #[error("video not found: {0}")]
    VideoNotFound(String),

    #[error("YouTube API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "YOUTUBE_API_KEY not found. Set the YOUTUBE_API_KEY environment variable, add api_key to {config}, \
         or run: echo YOUTUBE_API_KEY=\"[Your API Key]\" >> ~/.config/fabric/.env"
    )]
    MissingApiKey { config: String },

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
