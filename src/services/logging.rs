// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Logging setup and utilities for keeping credentials out of log output.

use crate::error::{Result, SearchError};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_level` when set. Lines always go to stdout
/// and are also appended to `log_file` when given. Calling this twice is
/// harmless; the second call leaves the first subscriber in place.
pub fn init(default_level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = log_file
        .map(file_appender)
        .transpose()?
        .map(|appender| fmt::layer().with_ansi(false).with_writer(appender));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init();
    Ok(())
}

/// Non-rotating appender for `path`, creating missing parent directories
pub fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let unusable = |reason: String| {
        SearchError::Configuration(vec![format!("LOG_FILE {}: {}", path.display(), reason)])
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| unusable("no file name".to_string()))?;
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(directory).map_err(|e| unusable(e.to_string()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy().into_owned())
        .build(directory)
        .map_err(|e| unusable(e.to_string()))
}

/// Redact a secret for logging.
/// Shows the first four characters of long secrets and hides the rest: "c2Vj***"
pub fn redact_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "***".to_string()
    } else {
        format!("{}***", visible)
    }
}
