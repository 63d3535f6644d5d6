use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Navigation settings, loaded from YAML. Every field has a default, so an
/// empty file is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavConfig {
    pub scroll: ScrollConfig,
    pub toc: TocConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrollConfig {
    /// Pixels added to `scroll_top` when picking the active heading.
    pub look_ahead: f64,
    /// How long a programmatic scroll suppresses URL updates when the
    /// container never reports that scrolling settled.
    pub settle_timeout_ms: u64,
}

impl ScrollConfig {
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            look_ahead: 150.0,
            settle_timeout_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TocConfig {
    /// Deepest heading level tracked for navigation.
    pub max_level: u8,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self { max_level: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// DOM id of the scroll container that wraps the article.
    pub container_id: String,
    /// Render sections with nested headings as `<details>`.
    pub expandable: bool,
    /// Whether expandable sections start open.
    pub open: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            container_id: "content-scroll-container".to_string(),
            expandable: true,
            open: true,
        }
    }
}

impl NavConfig {
    /// Load config from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=6).contains(&self.toc.max_level) {
            return Err(Error::ConfigParse(format!(
                "toc.max_level must be between 1 and 6, got {}",
                self.toc.max_level
            )));
        }
        if !self.scroll.look_ahead.is_finite() || self.scroll.look_ahead < 0.0 {
            return Err(Error::ConfigParse(format!(
                "scroll.look_ahead must be a non-negative number, got {}",
                self.scroll.look_ahead
            )));
        }
        if self.render.container_id.trim().is_empty() {
            return Err(Error::ConfigParse("render.container_id must not be empty".into()));
        }
        Ok(())
    }
}
