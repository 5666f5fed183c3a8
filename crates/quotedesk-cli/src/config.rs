// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use quotedesk_app::DEFAULT_NUMBER_PREFIX;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_VALIDITY_DAYS: i64 = 30;
const MAX_VALIDITY_DAYS: i64 = 3650;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub quotes: Quotes,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            quotes: Quotes::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Quotes {
    pub number_prefix: Option<String>,
    pub validity_days: Option<i64>,
}

impl Default for Quotes {
    fn default() -> Self {
        Self {
            number_prefix: Some(DEFAULT_NUMBER_PREFIX.to_owned()),
            validity_days: Some(DEFAULT_VALIDITY_DAYS),
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
        if let Some(path) = env::var_os("QUOTEDESK_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set QUOTEDESK_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(quotedesk_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
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
                    "config file {} is not versioned. Add `version = 1` and keep values under [storage], [quotes], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Run `quotedesk --print-example-config` for a template",
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
        if let Some(db_path) = &self.storage.db_path {
            quotedesk_db::validate_db_path(db_path)?;
        }

        if let Some(prefix) = &self.quotes.number_prefix {
            quotedesk_db::validate_number_prefix(prefix)
                .with_context(|| format!("quotes.number_prefix in {}", path.display()))?;
        }

        if let Some(days) = self.quotes.validity_days
            && !(1..=MAX_VALIDITY_DAYS).contains(&days)
        {
            bail!(
                "quotes.validity_days in {} must be between 1 and {}, got {}",
                path.display(),
                MAX_VALIDITY_DAYS,
                days
            );
        }

        if let Some(level) = &self.log.level {
            EnvFilter::try_new(level).map_err(|error| {
                anyhow!(
                    "log.level {level:?} in {} is not a valid filter ({error}); use a level like info or debug",
                    path.display()
                )
            })?;
        }

        if let Some(file) = &self.log.file
            && file.trim().is_empty()
        {
            bail!(
                "log.file in {} must not be empty; remove it to use the default",
                path.display()
            );
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => quotedesk_db::default_db_path(),
        }
    }

    pub fn number_prefix(&self) -> &str {
        self.quotes
            .number_prefix
            .as_deref()
            .unwrap_or(DEFAULT_NUMBER_PREFIX)
    }

    pub fn validity_days(&self) -> i64 {
        self.quotes.validity_days.unwrap_or(DEFAULT_VALIDITY_DAYS)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }

        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].file to a writable log path")
        })?;
        Ok(data_root
            .join(quotedesk_db::APP_NAME)
            .join(format!("{}.log", quotedesk_db::APP_NAME)))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# quotedesk config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/quotedesk/quotedesk.db)\n# db_path = \"/absolute/path/to/quotedesk.db\"\n\n[quotes]\n# Quote numbers look like {}-000001\nnumber_prefix = \"{}\"\n# Default validity for new quotes, in days\nvalidity_days = {}\n\n[log]\n# Overridden by QUOTEDESK_LOG\nlevel = \"{}\"\n# file = \"/absolute/path/to/quotedesk.log\"\n",
            path.display(),
            DEFAULT_NUMBER_PREFIX,
            DEFAULT_NUMBER_PREFIX,
            DEFAULT_VALIDITY_DAYS,
            DEFAULT_LOG_LEVEL,
        )
    }
}
