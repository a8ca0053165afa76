//! KabuStation local API adapter
//!
//! Implements the `TokenGateway` port against `POST {base}/token`.

pub mod client;
pub mod types;

pub use client::{KabusApiConfig, KabusApiGateway};
