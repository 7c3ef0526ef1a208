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

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use triton_probe_sdk::signing::{DEFAULT_NAMESPACE, DEFAULT_SSH_KEYGEN};

// Logging configuration constants
/// Default log level (can be overridden by RUST_LOG environment variable)
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log directory component name
pub const LOG_COMPONENT_NAME: &str = "probe";

/// Default console output enabled (can be overridden by LOG_TO_CONSOLE environment variable)
pub const DEFAULT_LOG_TO_CONSOLE: bool = true;

// Secret store constants
/// Namespace holding the credentials secret (can be overridden by PROBE_SECRET_NAMESPACE)
pub const DEFAULT_SECRET_NAMESPACE: &str = "kube-system";

/// Name of the credentials secret (can be overridden by PROBE_SECRET_NAME)
pub const DEFAULT_SECRET_NAME: &str = "triton-creds";

/// kubectl binary (can be overridden by PROBE_KUBECTL_BIN)
pub const DEFAULT_KUBECTL: &str = "kubectl";

/// Request timeout in seconds (can be overridden by PROBE_REQUEST_TIMEOUT_SECS)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable prefix for probe settings
pub const ENV_PREFIX: &str = "PROBE";

/// Where credentials come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretSourceKind {
	/// Kubernetes secret read through kubectl
	Kubernetes,
	/// `TRITON_*` environment variables and a key file on disk
	Env,
}

/// Probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
	pub secret_source: SecretSourceKind,
	pub secret_namespace: String,
	pub secret_name: String,
	pub kubectl_bin: String,
	pub ssh_keygen_bin: String,
	/// `-n` namespace for `ssh-keygen -Y sign`
	pub signing_namespace: String,
	pub request_timeout_secs: u64,
	/// Directory for the staged key and payload files (system temp dir if unset)
	pub staging_dir: Option<PathBuf>,
}

impl Default for ProbeConfig {
	fn default() -> Self {
		Self {
			secret_source: SecretSourceKind::Kubernetes,
			secret_namespace: DEFAULT_SECRET_NAMESPACE.to_string(),
			secret_name: DEFAULT_SECRET_NAME.to_string(),
			kubectl_bin: DEFAULT_KUBECTL.to_string(),
			ssh_keygen_bin: DEFAULT_SSH_KEYGEN.to_string(),
			signing_namespace: DEFAULT_NAMESPACE.to_string(),
			request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
			staging_dir: None,
		}
	}
}

impl ProbeConfig {
	/// Load configuration from environment variables
	pub fn from_env() -> Result<Self, config::ConfigError> {
		dotenv::dotenv().ok();

		let cfg = config::Config::builder()
			.add_source(environment())
			.build()?;

		cfg.try_deserialize()
	}

	/// Load configuration from file
	pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder()
			.add_source(config::File::with_name(path))
			.add_source(environment())
			.build()?;

		cfg.try_deserialize()
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}
}

fn environment() -> config::Environment {
	config::Environment::with_prefix(ENV_PREFIX).try_parsing(true)
}
