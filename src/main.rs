use std::path::PathBuf;

use eyre::{Result, WrapErr};
use log::{debug, info};
use ytmeta::config::{Config, CredentialProvider, DefaultCredentials};
use ytmeta::extract::{Extractor, Request};
use ytmeta::youtube::{DataApiClient, WebFetcher};

mod cli;

use cli::Cli;

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytmeta.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytmeta")
        .join("logs")
}

fn build_after_help() -> String {
    let log_path = log_dir().join("ytmeta.log");

    format!(
        "\nAPI KEY (first match wins):\n  \
         YOUTUBE_API_KEY environment variable\n  \
         api_key in {}\n  \
         YOUTUBE_API_KEY in {}\n\nLogs are written to: {}",
        ytmeta::config::config_path().display(),
        ytmeta::config::fabric_env_path().display(),
        log_path.display()
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_default();

    if cli.verbose {
        let config_path = ytmeta::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
    }

    // CLI flags take priority over config
    let request = Request {
        mode: cli.mode(),
        length: cli.length.or(config.default_length).unwrap_or(ytmeta::comments::DEFAULT_THRESHOLD),
        expand_replies: cli.all || config.expand_replies.unwrap_or(false),
        include_comments: cli.include_comments(),
        lang: cli
            .lang
            .clone()
            .or_else(|| config.default_lang.clone())
            .unwrap_or_else(|| "en".to_string()),
    };
    debug!("Request: {request:?}");

    let api_key = DefaultCredentials::new(&config).api_key()?;

    let client = reqwest::Client::new();
    let service = DataApiClient::new(client.clone(), api_key);
    let fetcher = WebFetcher::new(client);

    let output = Extractor::new(&service, &fetcher)
        .run(&cli.url, &request)
        .await
        .wrap_err_with(|| format!("failed to extract metadata for {}", cli.url))?;

    if cli.verbose {
        eprintln!("Mode: {}\nComment limit: {}\nExpand replies: {}", request.mode, request.length, request.expand_replies);
    }

    println!("{}", ytmeta::output::render(&output)?);

    Ok(())
}
