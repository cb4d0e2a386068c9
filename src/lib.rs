//! spacetraveling: a static blog generator backed by a headless CMS
//!
//! Posts are fetched from a Prismic-style content API, normalized into
//! display shape and rendered with an embedded Tera theme. A small axum
//! server serves the generated site and handles content preview.

pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod listing;
pub mod preview;
pub mod server;
pub mod templates;

use chrono_tz::Tz;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cms::{ContentSource, PrismicClient};
use error::Result;

/// The blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Time zone dates are displayed in
    pub tz: Tz,
}

impl Blog {
    /// Create a new instance from a directory, reading `_config.yml` when
    /// present and applying environment overrides
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };
        config.apply_env();

        Self::with_config(base_dir, config)
    }

    /// Create an instance from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        let tz = config.tz()?;

        Ok(Self {
            config,
            base_dir,
            public_dir,
            tz,
        })
    }

    /// Connect to the configured CMS
    pub fn content_source(&self) -> Result<Arc<dyn ContentSource>> {
        Ok(Arc::new(PrismicClient::new(&self.config.cms)?))
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<generator::GenerateSummary> {
        let source = self.content_source()?;
        generator::Generator::new(self, source)?.generate().await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
