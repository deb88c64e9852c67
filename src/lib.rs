// ABOUTME: Authenticated session manager and request dispatcher for the SCADA-LTS REST API
// ABOUTME: Re-exports the client, typed tool requests, prompt composer, and error types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

//! # SCADA-LTS Session and Dispatch
//!
//! Library core behind the SCADA-LTS MCP adapter. A [`ScadaClient`] owns one
//! connection: its configuration, its authentication session, and the
//! executor that talks to the upstream REST API.
//!
//! Tool invocations arrive as a name plus a loosely-typed JSON argument bag.
//! They are validated into a [`ToolRequest`] before any network call, then
//! executed against the [endpoint registry](endpoints). Every outcome ends in
//! a [`ToolCallResult`]; nothing escapes as a panic.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scada_lts::{ClientConfig, ScadaClient};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), scada_lts::ScadaError> {
//! let client = ScadaClient::new(&ClientConfig::default())?;
//! client
//!     .dispatch(
//!         "configure_connection",
//!         &json!({"base_url": "http://localhost:8080/Scada-LTS", "username": "admin", "password": "admin"}),
//!     )
//!     .await;
//! let result = client.dispatch("get_point_value", &json!({"point_id": 123})).await;
//! println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: error taxonomy and the per-call result contract
//! - [`config`]: connection and client configuration, env and file defaults
//! - [`endpoints`]: logical operation registry and URL rendering
//! - [`session`]: authentication state machine with single-flight login
//! - [`executor`]: one upstream call with the re-authenticate-once retry
//! - [`tools`]: typed tool requests and argument coercion
//! - [`client`]: the capability object and tool dispatcher
//! - [`compose`]: narrative prompt composition

/// Core types: errors and tool call results
pub mod types;

/// ScadaClient and tool dispatch
pub mod client;
/// Prompt composition
pub mod compose;
/// Connection and client configuration
pub mod config;
/// Static upstream endpoint registry
pub mod endpoints;
/// Request execution with re-authentication
pub mod executor;
/// Upstream HTTP plumbing
pub mod http;
/// Session manager and auth state machine
pub mod session;
/// Typed tool requests
pub mod tools;

pub use client::ScadaClient;
pub use compose::{ComposedPrompt, PromptRequest};
pub use config::{ClientConfig, ConnectionConfig};
pub use executor::{RequestExecutor, RequestPayload};
pub use session::{AuthState, SessionManager, SessionSnapshot};
pub use tools::{DataType, PointValue, ToolRequest};
pub use types::{ErrorKind, ScadaError, ToolCallResult, ToolError};
