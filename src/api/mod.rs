//! DigitalOcean API interaction module
//!
//! This module provides the core functionality for talking to the
//! DigitalOcean REST API: token acquisition, HTTP plumbing, and the
//! client that ties them to the configured API base.
//!
//! # Module Structure
//!
//! - [`auth`] - bearer-token acquisition behind an injectable provider
//! - [`client`] - main client for making API requests
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dosync::api::auth::EnvTokenProvider;
//! use dosync::api::client::DoClient;
//!
//! async fn example() -> dosync::error::SyncResult<()> {
//!     let client = DoClient::new(Arc::new(EnvTokenProvider))?;
//!     let droplets = client.get("/droplets").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
