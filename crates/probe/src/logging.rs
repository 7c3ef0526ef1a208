// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Logging initialization for the probe
//!
//! Console output is on by default; file output is opt-in.
//!
//! # Configuration
//!
//! The following environment variables can be used to configure logging:
//!
//! - `RUST_LOG`: Log level filter (default: `info`)
//!   - Examples: `debug`, `info`, `warn`, `error`
//!   - Can be set per module: `RUST_LOG=triton_probe_sdk=debug,reqwest=info`
//!
//! - `LOG_TO_CONSOLE`: Enable console output (default: `true`)
//!   - Set to `false`, `0`, or `no` to disable
//!   - Console output goes to stderr so stdout carries only the probe report
//!
//! - `LOG_DIR`: Root directory for log files (default: unset, no file output)
//!   - Log files are created in `{LOG_DIR}/probe/` directory
//!   - Example: `LOG_DIR=/var/log/triton`
//!
//! # Log File Format
//!
//! - Directory: `{LOG_DIR}/probe/`
//! - Rotation: one file per day (UTC) using `tracing_appender::rolling::RollingFileAppender`
//! - Filename: `{component}.{date}.log` format (e.g., `probe.2026-01-03.log`)
//! - Format: UTC timestamp, log level, target, message; no ANSI colors

use std::{
	env,
	path::{Path, PathBuf},
	sync::OnceLock,
};

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::{
	non_blocking,
	rolling::{self, Rotation},
};
use tracing_subscriber::{
	EnvFilter, fmt, layer::SubscriberExt, registry::Registry, util::SubscriberInitExt,
};

use crate::config::{DEFAULT_LOG_LEVEL, DEFAULT_LOG_TO_CONSOLE, LOG_COMPONENT_NAME};

// Store log guard to prevent log loss on program exit
static LOG_GUARD: OnceLock<non_blocking::WorkerGuard> = OnceLock::new();

/// Parse a boolean-ish environment value
fn parse_flag(value: &str) -> Option<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" => Some(true),
		"false" | "0" | "no" => Some(false),
		_ => None,
	}
}

/// Log directory for this component, if file logging is enabled
fn get_log_dir() -> Option<PathBuf> {
	env::var("LOG_DIR")
		.ok()
		.filter(|dir| !dir.trim().is_empty())
		.map(|dir| Path::new(&dir).join(LOG_COMPONENT_NAME))
}

/// Setup daily-rolling file logging layer.
///
/// Creates files like `probe.2026-01-03.log` in `log_dir`.
fn setup_file_logging(log_dir: &Path) -> Result<non_blocking::NonBlocking> {
	std::fs::create_dir_all(log_dir)
		.with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

	let file_appender = rolling::RollingFileAppender::builder()
		.rotation(Rotation::DAILY)
		.filename_prefix(LOG_COMPONENT_NAME.to_string())
		.filename_suffix(".log")
		.build(log_dir)
		.with_context(|| {
			format!(
				"Failed to create rolling file appender in {}",
				log_dir.display()
			)
		})?;

	let (file_writer, guard) = non_blocking(file_appender);
	LOG_GUARD.set(guard).ok();

	Ok(file_writer)
}

/// Initialize logging with console output and optional file output
///
/// # Returns
///
/// Returns `Ok(())` if logging is successfully initialized, or an error if
/// the log directory or file cannot be created.
pub fn init_logging() -> Result<()> {
	dotenv::dotenv().ok();

	let log_level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

	let log_to_console = env::var("LOG_TO_CONSOLE")
		.ok()
		.and_then(|v| parse_flag(&v))
		.unwrap_or(DEFAULT_LOG_TO_CONSOLE);

	let log_dir = get_log_dir();
	let file_layer = match &log_dir {
		Some(dir) => {
			let file_writer = setup_file_logging(dir)?;
			Some(
				fmt::layer()
					.with_writer(file_writer)
					.with_timer(fmt::time::UtcTime::rfc_3339())
					.with_target(true)
					.with_ansi(false),
			)
		}
		None => None,
	};

	let console_layer = log_to_console.then(|| {
		fmt::layer()
			.with_writer(std::io::stderr)
			.with_timer(fmt::time::UtcTime::rfc_3339())
			.with_target(true)
			.with_ansi(true)
	});

	Registry::default()
		.with(filter)
		.with(file_layer)
		.with(console_layer)
		.try_init()
		.context("Failed to install tracing subscriber")?;

	info!(target: "probe", "Log level: {}", log_level);
	if let Some(dir) = &log_dir {
		info!(target: "probe", "Log directory: {}", dir.display());
		info!(
			target: "probe",
			"Log file base name: {}.YYYY-MM-DD.log (daily rolling)",
			LOG_COMPONENT_NAME
		);
	}

	Ok(())
}
