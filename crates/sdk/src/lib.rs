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

//! Triton Probe SDK - signed CloudAPI requests
//!
//! This crate builds `Signature` authorization headers for CloudAPI and
//! sends the authenticated request:
//! - [`signing`]: canonical signing string, [`Signer`] capability, armor extraction
//! - [`key`]: owner-only temporary key files that wipe themselves on drop
//! - [`client`]: the HTTP call, reporting any status as a normal result
//!
//! The SDK is designed to be lightweight and embeddable:
//! - No background threads
//! - No runtime initialization
//! - No environment or configuration loading

pub mod client;
pub mod key;
pub mod signing;
pub mod types;

pub use client::{Client, ClientError, datacenter};
pub use key::SigningKey;
pub use signing::{
	Signer, SigningError, SshKeygenSigner, build_auth_header, extract_armored_signature,
	signing_string,
};
pub use types::*;
