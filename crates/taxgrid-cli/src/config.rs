// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use taxgrid_api::{DEFAULT_COUNTRIES_URL, DEFAULT_RECORDS_URL};
use taxgrid_app::DEFAULT_PAGE_SIZE;
use tracing_subscriber::EnvFilter;

pub const APP_NAME: &str = "taxgrid";
pub const CONFIG_PATH_ENV: &str = "TAXGRID_CONFIG_PATH";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub records_url: Option<String>,
    pub countries_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            records_url: Some(DEFAULT_RECORDS_URL.to_owned()),
            countries_url: Some(DEFAULT_COUNTRIES_URL.to_owned()),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub page_size: Option<i64>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            page_size: Some(DEFAULT_PAGE_SIZE as i64),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and put values under [api], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        taxgrid_api::parse_collection_url("api.records_url", self.records_url())
            .with_context(|| format!("invalid [api] in {}", path.display()))?;
        taxgrid_api::parse_collection_url("api.countries_url", self.countries_url())
            .with_context(|| format!("invalid [api] in {}", path.display()))?;

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(page_size) = self.ui.page_size
            && page_size < 1
        {
            bail!(
                "ui.page_size in {} must be at least 1, got {}",
                path.display(),
                page_size
            );
        }

        EnvFilter::try_new(self.log_level()).with_context(|| {
            format!(
                "log.level {:?} in {} is not a valid filter directive",
                self.log_level(),
                path.display()
            )
        })?;

        Ok(())
    }

    pub fn records_url(&self) -> &str {
        self.api
            .records_url
            .as_deref()
            .unwrap_or(DEFAULT_RECORDS_URL)
    }

    pub fn countries_url(&self) -> &str {
        self.api
            .countries_url
            .as_deref()
            .unwrap_or(DEFAULT_COUNTRIES_URL)
    }

    /// `None` waits on the API indefinitely.
    pub fn api_timeout(&self) -> Result<Option<Duration>> {
        self.api.timeout.as_deref().map(parse_duration).transpose()
    }

    pub fn page_size(&self) -> usize {
        self.ui
            .page_size
            .and_then(|size| usize::try_from(size).ok())
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let data_root = dirs::data_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].file to an explicit path")
        })?;
        Ok(data_root.join(APP_NAME).join("taxgrid.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# taxgrid config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nrecords_url = \"{}\"\ncountries_url = \"{}\"\n# Optional. Unset waits for the server indefinitely.\n# timeout = \"10s\"\n\n[ui]\npage_size = {}\n\n[log]\n# EnvFilter directive; TAXGRID_LOG overrides it\nlevel = \"{}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/taxgrid/taxgrid.log)\n# file = \"/absolute/path/to/taxgrid.log\"\n",
            path.display(),
            DEFAULT_RECORDS_URL,
            DEFAULT_COUNTRIES_URL,
            DEFAULT_PAGE_SIZE,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let invalid = || format!("invalid timeout duration {raw:?}");
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value.parse().with_context(invalid)?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value.parse().with_context(invalid)?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value.parse().with_context(invalid)?;
        return Ok(Duration::from_secs(mins.saturating_mul(60)));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
