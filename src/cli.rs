use clap::Parser;
use ytmeta::OutputMode;

#[derive(Parser)]
#[command(
    name = "ytmeta",
    about = "Extract duration, transcript and comments from a YouTube video",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URL
    pub url: String,

    /// Output only the duration in minutes
    #[arg(long)]
    pub duration: bool,

    /// Output only the transcript
    #[arg(long)]
    pub transcript: bool,

    /// Output only the comments, as JSON
    #[arg(long)]
    pub comments: bool,

    /// Maximum number of comments to fetch; also adds comments to the full record [default: 100]
    #[arg(long)]
    pub length: Option<usize>,

    /// Fetch every reply for threads with more than 5 replies; also adds comments to the full record
    #[arg(long)]
    pub all: bool,

    /// Preferred caption language [default: en]
    #[arg(long)]
    pub lang: Option<String>,

    /// Show extraction details on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Projection selected by the flags; duration wins over transcript,
    /// transcript over comments
    pub fn mode(&self) -> OutputMode {
        if self.duration {
            OutputMode::Duration
        } else if self.transcript {
            OutputMode::Transcript
        } else if self.comments {
            OutputMode::Comments
        } else {
            OutputMode::Full
        }
    }

    /// The full record carries comments only when `--length` or `--all`
    /// asks for them
    pub fn include_comments(&self) -> bool {
        self.length.is_some() || self.all
    }
}
