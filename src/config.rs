use crate::error::{Error, Result};
use crate::model::RunConfig;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Number of concurrent workers
    #[arg(long, default_value_t = 100)]
    pub workers: usize,

    /// Base URL for the API
    #[arg(long, default_value = "https://api.openai.com")]
    pub url: String,

    /// API key for authentication
    #[arg(long, default_value = "")]
    pub key: String,

    /// Model name to use
    #[arg(long, default_value = "gpt-4o-mini")]
    pub model: String,

    /// Interval between requests per worker, e.g. 500ms (0 for no interval)
    #[arg(long, default_value = "0", value_parser = humantime::parse_duration)]
    pub interval: Duration,

    /// File containing prompt text
    #[arg(long, default_value = "prompt.txt")]
    pub prompt: PathBuf,

    /// HTTP client timeout, e.g. 30s (0 for no timeout)
    #[arg(long, default_value = "0", value_parser = humantime::parse_duration)]
    pub timeout: Duration,
}

impl Args {
    /// Validate the flags and load the prompt. The key is checked first.
    pub fn into_config(self) -> Result<RunConfig> {
        if self.key.is_empty() {
            return Err(Error::MissingApiKey);
        }
        if self.workers == 0 {
            return Err(Error::InvalidWorkers);
        }
        let prompt = read_prompt(&self.prompt)?;

        Ok(RunConfig {
            workers: self.workers,
            base_url: self.url,
            api_key: self.key,
            model: self.model,
            prompt,
            interval: non_zero(self.interval),
            timeout: non_zero(self.timeout),
        })
    }
}

/// Read the prompt file, trimming surrounding whitespace.
pub fn read_prompt(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map(|text| text.trim().to_string())
        .map_err(|source| Error::Prompt {
            path: path.to_path_buf(),
            source,
        })
}

fn non_zero(duration: Duration) -> Option<Duration> {
    (!duration.is_zero()).then_some(duration)
}
