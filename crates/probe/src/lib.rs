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

//! Triton CloudAPI credential probe
//!
//! Pulls CloudAPI credentials from a secret store, signs a `date` header with
//! the account's SSH key and sends one authenticated `GET /my/volumes`.
//!
//! Flow (strictly sequential):
//! - Secret retrieval ([`secrets`])
//! - Key staging, signing and the request ([`probe`])
//! - Cleanup of every temporary file, on all exit paths

pub mod config;
pub mod logging;
pub mod probe;
pub mod secrets;

pub use config::{ProbeConfig, SecretSourceKind};
pub use probe::{ProbeReport, run_probe, ssh_keygen_signer};
pub use secrets::{SecretError, SecretSource, TritonCredentials, secret_source};
