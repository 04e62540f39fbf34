// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Chalo contributors

use crate::provider::http::DEFAULT_BASE_URL;
use crate::search::DEFAULT_MAX_DISTANCE_MILES;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides `api_base_url` when set.
pub const API_URL_ENV: &str = "CHALO_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub default_max_distance_miles: f64,
    pub request_timeout_secs: u64,
    /// Where favorites and the active trip live; defaults to the config root
    pub data_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            default_max_distance_miles: DEFAULT_MAX_DISTANCE_MILES,
            request_timeout_secs: 30,
            data_dir: None,
        }
    }
}

impl Settings {
    pub fn default_path() -> PathBuf {
        crate::get_config_root().join("settings.json")
    }

    /// Reads settings from `path`, then applies the environment override.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            log::debug!("No settings file, using defaults — path={}", path.display());
            Settings::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                settings.api_base_url = url.trim().to_string();
            }
        }

        Ok(settings)
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, content).context("Failed to write settings.json")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| crate::get_config_root().join("state"))
    }
}
