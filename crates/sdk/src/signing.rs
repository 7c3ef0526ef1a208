// Copyright 2025 chenjjiaa
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

//! Request signing for the CloudAPI `Signature` scheme
//!
//! The canonical signing string is `date: <timestamp>`. It is handed to a
//! [`Signer`], whose armored output is reduced to a single base64 string and
//! placed in the `Authorization` header next to the account key path.

use std::{
	io::Write,
	path::{Path, PathBuf},
	process::{Command, Stdio},
};

use tracing::debug;

use crate::key::SigningKey;
use crate::types::{Identity, SignedHeader, Timestamp};

/// Namespace passed to `ssh-keygen -Y sign`
pub const DEFAULT_NAMESPACE: &str = "application";

/// Default signing program
pub const DEFAULT_SSH_KEYGEN: &str = "ssh-keygen";

pub const ARMOR_BEGIN: &str = "-----BEGIN SSH SIGNATURE-----";
pub const ARMOR_END: &str = "-----END SSH SIGNATURE-----";

const PAYLOAD_FILE_PREFIX: &str = "probe-payload-";

/// Signer output included in extraction errors is cut to this many characters
const OUTPUT_SNIPPET_LEN: usize = 80;

/// Error types for signing operations
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
	#[error("Key staging error: {0}")]
	KeyStaging(String),
	#[error("Signer invocation error: {0}")]
	SignerInvocation(String),
	#[error("Signature extraction error: {0}")]
	SignatureExtraction(String),
}

/// Produces an armored SSH signature block over `payload`
pub trait Signer {
	fn sign(
		&self,
		key_path: &Path,
		namespace: &str,
		payload: &[u8],
	) -> Result<String, SigningError>;
}

/// [`Signer`] backed by `ssh-keygen -Y sign`.
///
/// The payload is written to a temporary file that becomes the child's
/// standard input; the armored block is read from its standard output.
#[derive(Debug, Clone)]
pub struct SshKeygenSigner {
	program: PathBuf,
	payload_dir: Option<PathBuf>,
}

impl Default for SshKeygenSigner {
	fn default() -> Self {
		Self::new()
	}
}

impl SshKeygenSigner {
	pub fn new() -> Self {
		Self {
			program: PathBuf::from(DEFAULT_SSH_KEYGEN),
			payload_dir: None,
		}
	}

	/// Use a different `ssh-keygen` binary
	pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
		self.program = program.into();
		self
	}

	/// Stage payload files in `dir` instead of the system temp directory
	pub fn with_payload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.payload_dir = Some(dir.into());
		self
	}

	pub fn program(&self) -> &Path {
		&self.program
	}
}

impl Signer for SshKeygenSigner {
	fn sign(
		&self,
		key_path: &Path,
		namespace: &str,
		payload: &[u8],
	) -> Result<String, SigningError> {
		let mut builder = tempfile::Builder::new();
		builder.prefix(PAYLOAD_FILE_PREFIX);
		let mut payload_file = match &self.payload_dir {
			Some(dir) => builder.tempfile_in(dir),
			None => builder.tempfile(),
		}
		.map_err(|e| {
			SigningError::SignerInvocation(format!("Failed to create payload file: {}", e))
		})?;

		payload_file.write_all(payload).map_err(|e| {
			SigningError::SignerInvocation(format!("Failed to write payload file: {}", e))
		})?;
		payload_file.flush().map_err(|e| {
			SigningError::SignerInvocation(format!("Failed to write payload file: {}", e))
		})?;
		let stdin = payload_file.reopen().map_err(|e| {
			SigningError::SignerInvocation(format!("Failed to reopen payload file: {}", e))
		})?;

		debug!(
			target: "signing",
			"Running {} -Y sign -f {} -n {} < {}",
			self.program.display(),
			key_path.display(),
			namespace,
			payload_file.path().display()
		);

		let output = Command::new(&self.program)
			.arg("-Y")
			.arg("sign")
			.arg("-f")
			.arg(key_path)
			.arg("-n")
			.arg(namespace)
			.stdin(Stdio::from(stdin))
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.output()
			.map_err(|e| {
				SigningError::SignerInvocation(format!(
					"Failed to run {}: {}",
					self.program.display(),
					e
				))
			})?;

		if !output.status.success() {
			return Err(SigningError::SignerInvocation(format!(
				"{} exited with {}: {}",
				self.program.display(),
				output.status,
				String::from_utf8_lossy(&output.stderr).trim()
			)));
		}

		String::from_utf8(output.stdout).map_err(|e| {
			SigningError::SignerInvocation(format!("Signer produced non-UTF-8 output: {}", e))
		})
	}
}

/// Canonical string covered by the signature
pub fn signing_string(timestamp: &Timestamp) -> String {
	format!("date: {}", timestamp)
}

/// Pull the base64 payload out of an armored SSH signature block.
///
/// Line breaks inside the armor are removed so the result fits in a single
/// header value.
pub fn extract_armored_signature(output: &str) -> Result<String, SigningError> {
	let start = output
		.find(ARMOR_BEGIN)
		.map(|idx| idx + ARMOR_BEGIN.len())
		.ok_or_else(|| {
			SigningError::SignatureExtraction(format!(
				"missing {} in signer output: {:?}",
				ARMOR_BEGIN,
				snippet(output)
			))
		})?;

	let body = &output[start..];
	let end = body.find(ARMOR_END).ok_or_else(|| {
		SigningError::SignatureExtraction(format!(
			"missing {} in signer output: {:?}",
			ARMOR_END,
			snippet(output)
		))
	})?;

	let signature: String = body[..end].chars().filter(|c| !c.is_whitespace()).collect();
	if signature.is_empty() {
		return Err(SigningError::SignatureExtraction(
			"armored block contains no signature".to_string(),
		));
	}

	Ok(signature)
}

/// Sign `date: <timestamp>` with `key` and assemble the `Authorization` header.
///
/// The caller must send the same `timestamp` as the request's `date` header.
pub fn build_auth_header<S: Signer + ?Sized>(
	identity: &Identity,
	signer: &S,
	key: &SigningKey,
	namespace: &str,
	timestamp: &Timestamp,
) -> Result<SignedHeader, SigningError> {
	let payload = signing_string(timestamp);
	let armored = signer.sign(key.path(), namespace, payload.as_bytes())?;
	let signature = extract_armored_signature(&armored)?;

	debug!(
		target: "signing",
		"Signed {:?} for {}",
		payload,
		identity.key_path()
	);

	Ok(SignedHeader::new(identity, signature))
}

fn snippet(output: &str) -> String {
	output.chars().take(OUTPUT_SNIPPET_LEN).collect()
}
