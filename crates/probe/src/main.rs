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

//! Triton credential probe
//!
//! Takes no arguments. Reads the credentials secret, sends one signed
//! `GET /my/volumes` and prints the status and raw body. An HTTP error
//! status is still a completed probe; only secret, signing and transport
//! failures exit non-zero.

use anyhow::{Context, Result};
use tracing::info;

use triton_probe::{
	ProbeConfig, TritonCredentials, logging::init_logging, run_probe, secret_source,
	ssh_keygen_signer,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
	// Initialize logging first
	init_logging()?;

	let config = ProbeConfig::from_env().context("Failed to load probe configuration")?;
	info!(target: "probe", "Reading credentials from {:?} source", config.secret_source);

	let source = secret_source(&config);
	let credentials =
		TritonCredentials::load(source.as_ref()).context("Failed to retrieve Triton credentials")?;

	let signer = ssh_keygen_signer(&config);
	let report = run_probe(&credentials, &signer, &config).await?;

	println!("{}", report);

	Ok(())
}
