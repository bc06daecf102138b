//! Persistent application configuration.
//!
//! Stored as JSON in a platform-appropriate config directory.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// On-disk configuration for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the item data (`Items/`, `Hideout/`, `projects.json`).
    pub data_dir: PathBuf,

    /// Reference icon directory. Defaults to `<data_dir>/Items/Images`.
    pub template_dir: Option<PathBuf>,

    /// Locale used for names and descriptions.
    pub language: String,

    /// Minimum composite score for a match to be accepted.
    pub match_threshold: f32,

    /// Side of the square cropped around the cursor from a full screenshot.
    pub capture_size: u32,

    pub recognition: ie::RecognitionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("Data"),
            template_dir: None,
            language: data::DEFAULT_LOCALE.to_string(),
            match_threshold: 0.4,
            capture_size: 160,
            recognition: ie::RecognitionConfig::default(),
        }
    }
}

impl Config {
    /// Path to the config file.
    pub fn path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("config_dir() unavailable")?;
        Ok(base.join("archelper.json"))
    }

    /// Load configuration from disk, falling back to defaults on missing file.
    pub fn load_or_default() -> Self {
        match Self::try_load() {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load config; using defaults");
                Self::default()
            }
        }
    }

    /// Try to load configuration from disk.
    pub fn try_load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(&path).with_context(|| format!("read {:?}", path))?;
        Self::from_json(&json).with_context(|| format!("parse {:?}", path))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut cfg: Self = serde_json::from_str(json)?;
        cfg.validate();
        Ok(cfg)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(&path, json).with_context(|| format!("write {:?}", path))?;
        Ok(())
    }

    /// Replace out-of-range values with usable ones.
    pub fn validate(&mut self) {
        if !data::SUPPORTED_LOCALES.contains(&self.language.as_str()) {
            tracing::warn!(language = %self.language, "unsupported language; using default");
            self.language = data::DEFAULT_LOCALE.to_string();
        }
        if !self.match_threshold.is_finite() {
            tracing::warn!(threshold = self.match_threshold, "match threshold is not a number; using default");
            self.match_threshold = Self::default().match_threshold;
        } else if !(0.0..=1.0).contains(&self.match_threshold) {
            tracing::warn!(threshold = self.match_threshold, "match threshold out of range; clamping");
            self.match_threshold = self.match_threshold.clamp(0.0, 1.0);
        }
        if self.capture_size == 0 {
            self.capture_size = Self::default().capture_size;
        }
        if self.recognition.icon_size == 0 {
            self.recognition.icon_size = ie::RecognitionConfig::default().icon_size;
        }
    }

    pub fn template_dir(&self) -> PathBuf {
        self.template_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join(data::catalog::ITEMS_DIR).join("Images"))
    }
}
