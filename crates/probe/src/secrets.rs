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

//! Credential retrieval
//!
//! Credentials are four values: account id, key id, CloudAPI URL and the
//! private key. A [`SecretSource`] supplies raw bytes per field;
//! [`TritonCredentials::load`] turns them into typed inputs for the signer.

use std::{env, fmt, path::PathBuf, process::Command};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use thiserror::Error;
use tracing::debug;
use triton_probe_sdk::Identity;

use crate::config::{ProbeConfig, SecretSourceKind};

/// Error types for secret retrieval
#[derive(Debug, Error)]
pub enum SecretError {
	#[error("Secret command failed: {0}")]
	Command(String),
	#[error("Secret value missing: {0}")]
	Missing(SecretField),
	#[error("Failed to decode {field}: {reason}")]
	Decode { field: SecretField, reason: String },
	#[error("Failed to read {field}: {source}")]
	Io {
		field: SecretField,
		#[source]
		source: std::io::Error,
	},
}

/// A value stored in the credentials secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretField {
	AccountId,
	KeyId,
	CloudApi,
	PrivateKey,
}

impl SecretField {
	/// Key inside the Kubernetes secret's `data`
	pub fn secret_key(self) -> &'static str {
		match self {
			SecretField::AccountId => "account-id",
			SecretField::KeyId => "key-id",
			SecretField::CloudApi => "cloudapi",
			SecretField::PrivateKey => "key.pem",
		}
	}

	/// Environment variable read by [`EnvSecretSource`]
	pub fn env_var(self) -> &'static str {
		match self {
			SecretField::AccountId => "TRITON_ACCOUNT_ID",
			SecretField::KeyId => "TRITON_KEY_ID",
			SecretField::CloudApi => "TRITON_CLOUD_API",
			SecretField::PrivateKey => "TRITON_PRIVATE_KEY_FILE",
		}
	}
}

impl fmt::Display for SecretField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.secret_key())
	}
}

/// Key-value store holding the credentials
pub trait SecretSource {
	/// Raw, decoded bytes of `field`
	fn fetch(&self, field: SecretField) -> Result<Vec<u8>, SecretError>;
}

/// Reads a Kubernetes secret through `kubectl`
#[derive(Debug, Clone)]
pub struct KubectlSecretSource {
	program: PathBuf,
	namespace: String,
	name: String,
}

impl KubectlSecretSource {
	pub fn new(
		program: impl Into<PathBuf>,
		namespace: impl Into<String>,
		name: impl Into<String>,
	) -> Self {
		Self {
			program: program.into(),
			namespace: namespace.into(),
			name: name.into(),
		}
	}

	/// `jsonpath` expression selecting `field`; dots in keys are escaped
	fn jsonpath(field: SecretField) -> String {
		format!("jsonpath={{.data.{}}}", field.secret_key().replace('.', "\\."))
	}
}

impl SecretSource for KubectlSecretSource {
	fn fetch(&self, field: SecretField) -> Result<Vec<u8>, SecretError> {
		debug!(
			target: "secrets",
			"Reading {} from secret {}/{}",
			field,
			self.namespace,
			self.name
		);

		let output = Command::new(&self.program)
			.args(["get", "secret", "-n", self.namespace.as_str(), self.name.as_str(), "-o"])
			.arg(Self::jsonpath(field))
			.output()
			.map_err(|e| {
				SecretError::Command(format!("Failed to run {}: {}", self.program.display(), e))
			})?;

		if !output.status.success() {
			return Err(SecretError::Command(format!(
				"{} exited with {}: {}",
				self.program.display(),
				output.status,
				String::from_utf8_lossy(&output.stderr).trim()
			)));
		}

		decode_secret_value(field, &output.stdout)
	}
}

/// Reads `TRITON_*` environment variables; the private key is loaded from
/// the file named by `TRITON_PRIVATE_KEY_FILE`.
pub struct EnvSecretSource {
	lookup: Box<dyn Fn(&str) -> Option<String>>,
}

impl Default for EnvSecretSource {
	fn default() -> Self {
		Self::new()
	}
}

impl EnvSecretSource {
	pub fn new() -> Self {
		Self::with_lookup(|name| env::var(name).ok())
	}

	/// Use `lookup` instead of the process environment
	pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
		Self {
			lookup: Box::new(lookup),
		}
	}
}

impl SecretSource for EnvSecretSource {
	fn fetch(&self, field: SecretField) -> Result<Vec<u8>, SecretError> {
		let value = (self.lookup)(field.env_var())
			.filter(|value| !value.trim().is_empty())
			.ok_or(SecretError::Missing(field))?;

		match field {
			SecretField::PrivateKey => {
				std::fs::read(value.trim()).map_err(|source| SecretError::Io { field, source })
			}
			_ => Ok(value.into_bytes()),
		}
	}
}

/// Base64-decode a value as stored in a Kubernetes secret
pub fn decode_secret_value(field: SecretField, raw: &[u8]) -> Result<Vec<u8>, SecretError> {
	let encoded: Vec<u8> = raw
		.iter()
		.copied()
		.filter(|b| !b.is_ascii_whitespace())
		.collect();
	if encoded.is_empty() {
		return Err(SecretError::Missing(field));
	}

	STANDARD.decode(&encoded).map_err(|e| SecretError::Decode {
		field,
		reason: e.to_string(),
	})
}

/// Select the secret source named by the configuration
pub fn secret_source(config: &ProbeConfig) -> Box<dyn SecretSource> {
	match config.secret_source {
		SecretSourceKind::Kubernetes => Box::new(KubectlSecretSource::new(
			&config.kubectl_bin,
			&config.secret_namespace,
			&config.secret_name,
		)),
		SecretSourceKind::Env => Box::new(EnvSecretSource::new()),
	}
}

/// Everything needed to sign and send the probe request
#[derive(Clone)]
pub struct TritonCredentials {
	pub identity: Identity,
	/// CloudAPI base URL
	pub cloudapi: String,
	/// Private key bytes, as stored
	pub private_key: Vec<u8>,
}

impl fmt::Debug for TritonCredentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TritonCredentials")
			.field("identity", &self.identity)
			.field("cloudapi", &self.cloudapi)
			.field("private_key", &format_args!("<{} bytes>", self.private_key.len()))
			.finish()
	}
}

impl TritonCredentials {
	/// Fetch all four values from `source`
	pub fn load(source: &dyn SecretSource) -> Result<Self, SecretError> {
		let account_id = fetch_text(source, SecretField::AccountId)?;
		let key_id = fetch_text(source, SecretField::KeyId)?;
		let cloudapi = fetch_text(source, SecretField::CloudApi)?;
		let private_key = source.fetch(SecretField::PrivateKey)?;
		if private_key.is_empty() {
			return Err(SecretError::Missing(SecretField::PrivateKey));
		}

		Ok(Self {
			identity: Identity::new(account_id, key_id),
			cloudapi,
			private_key,
		})
	}
}

fn fetch_text(source: &dyn SecretSource, field: SecretField) -> Result<String, SecretError> {
	let bytes = source.fetch(field)?;
	let text = String::from_utf8(bytes).map_err(|e| SecretError::Decode {
		field,
		reason: e.to_string(),
	})?;
	let text = text.trim();
	if text.is_empty() {
		return Err(SecretError::Missing(field));
	}
	Ok(text.to_string())
}
