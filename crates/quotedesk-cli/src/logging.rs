// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "QUOTEDESK_LOG";

/// `QUOTEDESK_LOG` wins over the configured level when it is set and non-blank.
pub fn build_filter(env_value: Option<&str>, level: &str) -> Result<EnvFilter> {
    match env_value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|error| anyhow!("invalid {LOG_ENV} value {directives:?}: {error}")),
        None => EnvFilter::try_new(level)
            .map_err(|error| anyhow!("invalid log level {level:?}: {error}")),
    }
}

/// Appender for a single, never-rotated log file. Missing parent
/// directories are created and existing content is appended to.
pub fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            anyhow!(
                "log path {} has no file name -- set [log].file to a file path",
                path.display()
            )
        })?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].file to a writable path",
                path.display()
            )
        })
}

/// Installs the global subscriber. The terminal belongs to the TUI, so
/// output goes to `path` without ANSI colors.
pub fn init_logging(level: &str, path: &Path) -> Result<()> {
    let env_value = std::env::var(LOG_ENV).ok();
    let filter = build_filter(env_value.as_deref(), level)?;
    let appender = file_appender(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(appender)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;

    tracing::debug!(log_file = %path.display(), "logging initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{build_filter, file_appender};
    use anyhow::Result;
    use std::io::Write;

    #[test]
    fn env_value_takes_precedence_over_level() -> Result<()> {
        let filter = build_filter(Some("quotedesk_db=trace"), "warn")?;
        assert_eq!(filter.to_string(), "quotedesk_db=trace");
        Ok(())
    }

    #[test]
    fn blank_env_value_falls_back_to_level() -> Result<()> {
        let filter = build_filter(Some("   "), "debug")?;
        assert_eq!(filter.to_string(), "debug");

        let filter = build_filter(None, "info")?;
        assert_eq!(filter.to_string(), "info");
        Ok(())
    }

    #[test]
    fn invalid_env_value_names_the_variable() {
        let error =
            build_filter(Some("quotedesk=loud"), "info").expect_err("bad directive should fail");
        assert!(error.to_string().contains("QUOTEDESK_LOG"));
    }

    #[test]
    fn file_appender_creates_parent_and_appends_to_exact_path() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("quotedesk.log");

        let mut first = file_appender(&path)?;
        first.write_all(b"one\n")?;
        first.flush()?;
        drop(first);
        let mut second = file_appender(&path)?;
        second.write_all(b"two\n")?;
        second.flush()?;
        drop(second);

        assert_eq!(std::fs::read_to_string(&path)?, "one\ntwo\n");
        let entries = std::fs::read_dir(temp.path().join("nested"))?.count();
        assert_eq!(entries, 1);
        Ok(())
    }

    #[test]
    fn file_appender_rejects_path_without_file_name() {
        let error = file_appender(std::path::Path::new("/")).expect_err("root has no file name");
        assert!(error.to_string().contains("[log].file"));
    }
}
