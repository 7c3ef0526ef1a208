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

//! The authenticated probe request
//!
//! Stages the key, signs `date: <now>`, sends `GET /my/volumes` and reports
//! whatever came back. The staged key is dropped (wiped and removed) as soon
//! as the header is built, so every later failure leaves nothing on disk.

use std::fmt;

use anyhow::{Context, Result};
use tracing::{info, warn};
use triton_probe_sdk::{
	Client, ProbeResponse, Signer, SigningKey, SshKeygenSigner, Timestamp, build_auth_header,
	datacenter, signing_string,
};

use crate::{config::ProbeConfig, secrets::TritonCredentials};

/// Characters of the signature echoed in logs and the report
const SIGNATURE_PREFIX_LEN: usize = 20;

/// Outcome of one probe request
#[derive(Debug, Clone)]
pub struct ProbeReport {
	pub account_id: String,
	pub key_id: String,
	/// `/{account}/keys/{key}`
	pub key_path: String,
	pub cloudapi: String,
	pub datacenter: Option<String>,
	pub key_type: Option<String>,
	pub timestamp: Timestamp,
	pub signature_prefix: String,
	pub header_length: usize,
	pub response: ProbeResponse,
}

/// `ssh-keygen` signer configured from `config`
pub fn ssh_keygen_signer(config: &ProbeConfig) -> SshKeygenSigner {
	let signer = SshKeygenSigner::new().with_program(&config.ssh_keygen_bin);
	match &config.staging_dir {
		Some(dir) => signer.with_payload_dir(dir),
		None => signer,
	}
}

/// Sign and send the probe request.
///
/// Any HTTP status yields a report; secret staging, signing and transport
/// failures are errors.
pub async fn run_probe(
	credentials: &TritonCredentials,
	signer: &dyn Signer,
	config: &ProbeConfig,
) -> Result<ProbeReport> {
	let identity = &credentials.identity;
	let datacenter = datacenter(&credentials.cloudapi);
	info!(
		target: "probe",
		"Probing {} (datacenter: {}) as {}",
		credentials.cloudapi,
		datacenter.as_deref().unwrap_or("unknown"),
		identity.key_path()
	);

	let key = SigningKey::stage_in(&credentials.private_key, config.staging_dir.as_deref())
		.context("Failed to stage private key")?;
	info!(target: "probe", "Private key file: {}", key.path().display());
	let key_type = key.key_type().map(str::to_string);
	match &key_type {
		Some(key_type) => info!(target: "probe", "Key type: {}", key_type),
		None => warn!(target: "probe", "Private key has no readable header line"),
	}

	let timestamp = Timestamp::now();
	info!(target: "probe", "Signing string: {}", signing_string(&timestamp));

	let header = build_auth_header(
		identity,
		signer,
		&key,
		&config.signing_namespace,
		&timestamp,
	)
	.context("Failed to sign request")?;
	drop(key);

	let header_length = header.header_value().len();
	let signature_prefix: String = header.signature.chars().take(SIGNATURE_PREFIX_LEN).collect();
	info!(target: "probe", "Signature (first {} chars): {}...", SIGNATURE_PREFIX_LEN, signature_prefix);
	info!(target: "probe", "Full Authorization header length: {}", header_length);

	let client = Client::with_config(&credentials.cloudapi, config.request_timeout())
		.context("Failed to create CloudAPI client")?;
	let response = client
		.list_volumes(&header, &timestamp)
		.await
		.with_context(|| format!("Request to {} failed", client.volumes_url()))?;

	if response.is_success() {
		info!(target: "probe", "CloudAPI accepted the credentials ({})", response.status);
	} else {
		warn!(target: "probe", "CloudAPI answered with HTTP {}", response.status);
	}

	Ok(ProbeReport {
		account_id: identity.account_id.clone(),
		key_id: identity.key_id.clone(),
		key_path: identity.key_path(),
		cloudapi: credentials.cloudapi.clone(),
		datacenter,
		key_type,
		timestamp,
		signature_prefix,
		header_length,
		response,
	})
}

impl fmt::Display for ProbeReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "Account ID: {}", self.account_id)?;
		writeln!(f, "Key ID: {}", self.key_id)?;
		writeln!(f, "Formatted Key ID: {}", self.key_path)?;
		writeln!(f, "CloudAPI: {}", self.cloudapi)?;
		if let Some(datacenter) = &self.datacenter {
			writeln!(f, "Datacenter: {}", datacenter)?;
		}
		writeln!(f, "Date: {}", self.timestamp)?;
		writeln!(f, "Signature (first {} chars): {}...", SIGNATURE_PREFIX_LEN, self.signature_prefix)?;
		writeln!(f, "Authorization header length: {}", self.header_length)?;
		writeln!(f, "Response HTTP Status: {}", self.response.status)?;
		write!(f, "Response Body: {}", self.response.body)?;

		if self.response.is_success() {
			if let Ok(volumes) = self.response.volumes() {
				write!(f, "\nVolumes: {}", volumes.len())?;
				for volume in &volumes {
					write!(f, "\n  {} {} ({})", volume.id, volume.name, volume.state)?;
				}
			}
		}

		Ok(())
	}
}
