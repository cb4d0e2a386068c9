//! Site configuration (_config.yml)

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{BlogError, Result};

/// Environment variable overriding `cms.endpoint`
pub const ENV_API_ENDPOINT: &str = "PRISMIC_API_ENDPOINT";
/// Environment variable overriding `cms.access_token`
pub const ENV_ACCESS_TOKEN: &str = "PRISMIC_ACCESS_TOKEN";
/// Environment variable overriding `preview.secret`
pub const ENV_PREVIEW_SECRET: &str = "SPACETRAVELING_PREVIEW_SECRET";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub url: String,
    pub root: String,
    pub timezone: String,

    // Directory
    pub public_dir: String,

    // Backend
    pub cms: CmsConfig,

    // Widgets
    pub comments: CommentsConfig,
    pub preview: PreviewConfig,

    /// Seconds after which the server re-renders a generated post page
    pub revalidate_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),
            timezone: "America/Sao_Paulo".to_string(),

            public_dir: "public".to_string(),

            cms: CmsConfig::default(),
            comments: CommentsConfig::default(),
            preview: PreviewConfig::default(),

            revalidate_secs: 60 * 30,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_API_ENDPOINT).filter(|v| !v.is_empty()) {
            self.cms.endpoint = endpoint;
        }
        if let Some(token) = lookup(ENV_ACCESS_TOKEN).filter(|v| !v.is_empty()) {
            self.cms.access_token = Some(token);
        }
        if let Some(secret) = lookup(ENV_PREVIEW_SECRET).filter(|v| !v.is_empty()) {
            self.preview.secret = Some(secret);
        }
        tracing::debug!("CMS endpoint: {}", self.cms.endpoint);
    }

    /// Parse the configured time zone
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| BlogError::config(format!("timezone '{}': {}", self.timezone, e)))
    }
}

/// Headless CMS connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// API entry point, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Posts per listing page
    pub page_size: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            page_size: 1,
            timeout_secs: 10,
            user_agent: format!("spacetraveling/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// utterances comment widget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    /// GitHub `owner/name`; the widget is omitted when empty
    pub repo: String,
    pub issue_term: String,
    pub theme: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            repo: String::new(),
            issue_term: "pathname".to_string(),
            theme: "dark-blue".to_string(),
        }
    }
}

/// Preview session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Cookie signing secret, at least 32 bytes
    pub secret: Option<String>,
    pub session_minutes: i64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            secret: None,
            session_minutes: 30,
        }
    }
}
