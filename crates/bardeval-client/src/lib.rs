//! bardeval-client: REST client for the hosted evaluation platform
//!
//! Implements [`bardeval_core::EvalPlatform`] over HTTP with `reqwest`.
//! Configuration comes from `OKAREO_API_KEY` and `OKAREO_BASE_URL`.

mod client;
mod config;

pub use client::OkareoClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
