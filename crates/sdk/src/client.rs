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

use crate::types::{ProbeResponse, SignedHeader, Timestamp};
use reqwest::{Client as ReqwestClient, Url, header::AUTHORIZATION};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error types for client operations
///
/// An HTTP error status is not a `ClientError`; it comes back as a
/// [`ProbeResponse`] so the caller can report it.
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("Network error: {0}")]
	Network(String),
	#[error("Client configuration error: {0}")]
	Configuration(String),
}

/// Client for CloudAPI
pub struct Client {
	base_url: String,
	client: ReqwestClient,
}

impl Client {
	/// Create a new client with the given base URL
	pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
		Self::with_config(base_url, DEFAULT_TIMEOUT)
	}

	/// Create a new client with a custom request timeout
	pub fn with_config(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ClientError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			base_url: base_url.into(),
			client,
		})
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// `{base_url}/my/volumes`
	pub fn volumes_url(&self) -> String {
		format!("{}/my/volumes", self.base_url.trim_end_matches('/'))
	}

	/// GET `url` with the `date` and `Authorization` headers.
	///
	/// Any HTTP status is returned as a [`ProbeResponse`]; only transport
	/// failures are errors.
	pub async fn send_authenticated_request(
		&self,
		url: &str,
		header: &SignedHeader,
		timestamp: &Timestamp,
	) -> Result<ProbeResponse, ClientError> {
		debug!(target: "client", "GET {}", url);

		let response = self
			.client
			.get(url)
			.header("date", timestamp.as_str())
			.header(AUTHORIZATION, header.header_value())
			.send()
			.await
			.map_err(|e| ClientError::Network(format!("Request failed: {}", e)))?;

		let status = response.status().as_u16();
		let body = response
			.text()
			.await
			.map_err(|e| ClientError::Network(format!("Failed to read response body: {}", e)))?;

		debug!(target: "client", "GET {} -> {} ({} bytes)", url, status, body.len());

		Ok(ProbeResponse { status, body })
	}

	/// List the account's volumes
	pub async fn list_volumes(
		&self,
		header: &SignedHeader,
		timestamp: &Timestamp,
	) -> Result<ProbeResponse, ClientError> {
		let url = self.volumes_url();
		self.send_authenticated_request(&url, header, timestamp)
			.await
	}
}

/// Datacenter name encoded in a CloudAPI endpoint: the first label of the host
/// (`https://us-central-1.api.mnx.io` -> `us-central-1`).
///
/// Returns `None` for unparsable URLs and IP-address hosts.
pub fn datacenter(endpoint: &str) -> Option<String> {
	let url = Url::parse(endpoint).ok()?;
	let domain = url.domain()?;
	domain
		.split('.')
		.next()
		.filter(|label| !label.is_empty())
		.map(str::to_string)
}
