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

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// `date` header format expected by CloudAPI (RFC 1123 with a literal `GMT`)
pub const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Algorithm advertised in the `Authorization` header
pub const SIGNATURE_ALGORITHM: &str = "rsa-sha256";

/// Request headers covered by the signature
pub const SIGNED_HEADERS: &str = "date";

/// Account and key pair identifying the caller to CloudAPI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	/// Account login or UUID
	pub account_id: String,
	/// Key name or fingerprint registered on the account
	pub key_id: String,
}

impl Identity {
	pub fn new(account_id: impl Into<String>, key_id: impl Into<String>) -> Self {
		Self {
			account_id: account_id.into(),
			key_id: key_id.into(),
		}
	}

	/// Signature `keyId` field: `/{account_id}/keys/{key_id}`
	pub fn key_path(&self) -> String {
		format!("/{}/keys/{}", self.account_id, self.key_id)
	}
}

/// A formatted `date` header value.
///
/// The same instance must feed both the signing string and the outgoing
/// `date` header; the server recomputes the signing string from the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp(String);

impl Timestamp {
	/// Current UTC time
	pub fn now() -> Self {
		Self::from_datetime(Utc::now())
	}

	pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
		Self(datetime.format(DATE_FORMAT).to_string())
	}

	/// Accept an already formatted value, rejecting anything that does not
	/// match [`DATE_FORMAT`].
	pub fn parse(value: &str) -> Result<Self, chrono::ParseError> {
		NaiveDateTime::parse_from_str(value, DATE_FORMAT)?;
		Ok(Self(value.to_string()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for Timestamp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Parsed form of a `Signature` authorization header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeader {
	/// `/{account}/keys/{key}`
	pub key_id: String,
	/// Always [`SIGNATURE_ALGORITHM`]
	pub algorithm: String,
	/// Always [`SIGNED_HEADERS`]
	pub headers: String,
	/// Contiguous base64 signature
	pub signature: String,
}

impl SignedHeader {
	pub fn new(identity: &Identity, signature: impl Into<String>) -> Self {
		Self {
			key_id: identity.key_path(),
			algorithm: SIGNATURE_ALGORITHM.to_string(),
			headers: SIGNED_HEADERS.to_string(),
			signature: signature.into(),
		}
	}

	/// Value for the `Authorization` request header
	pub fn header_value(&self) -> String {
		self.to_string()
	}
}

impl fmt::Display for SignedHeader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Signature keyId=\"{}\",algorithm=\"{}\",headers=\"{}\",signature=\"{}\"",
			self.key_id, self.algorithm, self.headers, self.signature
		)
	}
}

/// Status and raw body of a CloudAPI response.
///
/// Non-2xx statuses are ordinary results here; callers decide how to report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
	pub status: u16,
	pub body: String,
}

impl ProbeResponse {
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Interpret the body as a `/my/volumes` listing
	pub fn volumes(&self) -> Result<Vec<Volume>, serde_json::Error> {
		serde_json::from_str(&self.body)
	}
}

/// Volume record as returned by `GET /my/volumes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
	pub id: String,
	pub name: String,
	pub state: String,
	/// Volume type (e.g., "tritonnfs")
	#[serde(rename = "type")]
	pub volume_type: String,
	/// Size in MiB
	#[serde(default)]
	pub size: Option<u64>,
	/// NFS export path, present once the volume is ready
	#[serde(default)]
	pub filesystem_path: Option<String>,
}
