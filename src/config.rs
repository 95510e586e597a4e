//! Bot configuration, read from `~/.config/leadbot/config.toml` (or the
//! path passed with `--config`). Every field falls back to a built-in
//! default, so an empty file is a valid config.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::twitter::api::DEFAULT_BASE_URL;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// X API v2 over HTTPS.
    #[default]
    Api,
    /// The `bird` CLI.
    Bird,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Search phrases; each one becomes a recent-search query.
    pub keywords: Vec<String>,
    /// Posts containing any of these (case-insensitive) are skipped.
    pub skip_keywords: Vec<String>,
    /// One is chosen at random for each reply.
    pub reply_templates: Vec<String>,
    pub max_replies_per_day: u32,
    pub reply_delay_secs: u64,
    pub interval_minutes: u64,
    pub error_backoff_secs: u64,
    pub search_max_results: u32,
    /// Appended to every keyword query.
    pub query_suffix: String,
    /// Find mode only searches this many of the keywords.
    pub find_keyword_limit: usize,
    /// Number of leads printed in find mode.
    pub find_top: usize,
    pub ledger_path: PathBuf,
    pub backend: Backend,
    pub api_base_url: String,
    pub wait_on_rate_limit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keywords: to_strings(DEFAULT_KEYWORDS),
            skip_keywords: to_strings(DEFAULT_SKIP_KEYWORDS),
            reply_templates: to_strings(DEFAULT_TEMPLATES),
            max_replies_per_day: 15,
            reply_delay_secs: 300,
            interval_minutes: 30,
            error_backoff_secs: 60,
            search_max_results: 10,
            query_suffix: "-is:retweet -is:reply lang:en".to_string(),
            find_keyword_limit: 5,
            find_top: 20,
            ledger_path: PathBuf::from("replied_tweets.json"),
            backend: Backend::Api,
            api_base_url: DEFAULT_BASE_URL.to_string(),
            wait_on_rate_limit: true,
        }
    }
}

impl Config {
    /// Default config location: `<config dir>/leadbot/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("leadbot").join("config.toml"))
    }

    /// Load an explicit path, or the default location if it exists, or the
    /// built-in defaults. The result is validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::load_from(&path)?,
                None => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::Invalid("keywords must not be empty".into()));
        }
        if self.reply_templates.iter().all(|t| t.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "reply_templates must not be empty".into(),
            ));
        }
        if self.search_max_results == 0 {
            return Err(ConfigError::Invalid(
                "search_max_results must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Keywords as issued to the search endpoint.
    pub fn queries(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(|k| (k, build_query(k, &self.query_suffix)))
    }

    pub fn reply_templates(&self) -> Vec<String> {
        self.reply_templates
            .iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect()
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_secs(self.reply_delay_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }
}

pub fn build_query(keyword: &str, suffix: &str) -> String {
    let suffix = suffix.trim();
    if suffix.is_empty() {
        keyword.to_string()
    } else {
        format!("{} {}", keyword, suffix)
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

const DEFAULT_KEYWORDS: &[&str] = &[
    "how to repurpose content",
    "turn blog into twitter",
    "turn article into thread",
    "content repurposing tool",
    "blog to social media",
    "article to linkedin",
    "thread writer",
    "need a twitter thread",
    "help me write a thread",
    "social media content ideas",
    "repurpose my blog",
    "turn this into a thread",
    "anyone know a tool for",
    "content creation is exhausting",
    "spending too much time on content",
    "automate social media",
];

const DEFAULT_SKIP_KEYWORDS: &[&str] = &[
    "hiring",
    "job",
    "salary",
    "selling",
    "buy my",
    "check out my",
    "affiliate",
];

const DEFAULT_TEMPLATES: &[&str] = &[
    "I built something for exactly this!\n\nPaste any article URL → get a viral-style thread in 10 seconds.\n\nFree to try: repurposeai.app\n\nWould love your feedback if you try it 🙏",
    "Been there! Content repurposing used to take me hours.\n\nI made a tool that does it in seconds: paste a URL, pick Twitter/LinkedIn/Threads, done.\n\nrepurposeai.app (free tier available)\n\nHappy to help if you have questions!",
    "This is literally why I built repurposeai.app\n\n→ Paste any article/blog URL\n→ Pick your platform\n→ Get viral-format content instantly\n\nFree 3x/day. Saves me hours every week.",
    "I feel this pain! Spent way too long doing this manually.\n\nNow I use repurposeai.app, which takes any URL and turns it into platform-native content.\n\nFree to try, no credit card needed.",
];
