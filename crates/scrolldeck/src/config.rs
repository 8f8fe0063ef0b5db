use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::deck::visibility::DEFAULT_THRESHOLD;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "scrolldeck";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    /// Visible fraction at which a section becomes active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking: Option<Tracking>,

    /// 1-indexed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_slide: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tracking {
    #[default]
    Auto,
    Off,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `scrolldeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("using default config: {e:#}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# ScrollDeck configuration\n{yaml}");
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn theme(&self) -> &str {
        self.defaults
            .as_ref()
            .and_then(|d| d.theme.as_deref())
            .unwrap_or("dark")
    }

    pub fn threshold(&self) -> f32 {
        self.defaults
            .as_ref()
            .and_then(|d| d.threshold)
            .filter(|t| valid_threshold(*t))
            .unwrap_or(DEFAULT_THRESHOLD)
    }

    pub fn tracking(&self) -> Tracking {
        self.defaults
            .as_ref()
            .and_then(|d| d.tracking)
            .unwrap_or_default()
    }

    pub fn start_slide(&self) -> Option<usize> {
        self.defaults.as_ref().and_then(|d| d.start_slide)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .theme = Some(value.to_string());
            }
            "defaults.threshold" => {
                let threshold = value
                    .parse::<f32>()
                    .ok()
                    .filter(|t| valid_threshold(*t))
                    .ok_or_else(|| {
                        anyhow::anyhow!(
                            "Invalid threshold: {value}. Must be a number in (0, 1]."
                        )
                    })?;
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .threshold = Some(threshold);
            }
            "defaults.tracking" => {
                let tracking = match value {
                    "auto" => Tracking::Auto,
                    "off" => Tracking::Off,
                    _ => anyhow::bail!("Invalid tracking: {value}. Must be 'auto' or 'off'."),
                };
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .tracking = Some(tracking);
            }
            "defaults.start_slide" => {
                let slide = value.parse::<usize>().ok().filter(|n| *n >= 1).ok_or_else(|| {
                    anyhow::anyhow!("Invalid start_slide: {value}. Must be a slide number (1 or more).")
                })?;
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .start_slide = Some(slide);
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.theme, defaults.threshold, defaults.tracking, defaults.start_slide"
            ),
        }
        Ok(())
    }
}

fn valid_threshold(t: f32) -> bool {
    t > 0.0 && t <= 1.0
}
