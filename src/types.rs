// ABOUTME: Core types for the SCADA-LTS adapter: error taxonomy and per-call tool results
// ABOUTME: Provides ScadaError with typed kinds and the ToolCallResult response contract
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

//! # Core Types
//!
//! Every fault the adapter can produce is a [`ScadaError`]. Nothing escapes the
//! call boundary as a panic: tool invocations always end in a [`ToolCallResult`],
//! successful or carrying one of the [`ErrorKind`] categories.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Error Type
// ============================================================================

/// Error type for SCADA-LTS adapter operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScadaError {
    /// Error category
    pub kind: ErrorKind,
    /// Human-readable error message (upstream bodies are kept verbatim)
    pub message: String,
    /// Upstream HTTP status, when the error came from an HTTP response
    pub status: Option<u16>,
}

/// Categories of errors produced while dispatching a tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Bad or missing arguments; never reaches the network
    #[serde(rename = "ValidationError")]
    Validation,
    /// Unknown tool, prompt, or upstream operation name
    #[serde(rename = "NotFoundOperation")]
    NotFoundOperation,
    /// Login failed or the upstream kept rejecting credentials
    #[serde(rename = "AuthError")]
    Auth,
    /// Transport-level failure: refused connection, timeout, DNS
    #[serde(rename = "ConnectivityError")]
    Connectivity,
    /// Upstream answered with a non-2xx status
    #[serde(rename = "UpstreamError")]
    Upstream,
    /// Upstream answered 2xx with a body that is not valid JSON
    #[serde(rename = "ParseError")]
    Parse,
    /// Local fault (client construction, serialization)
    #[serde(rename = "InternalError")]
    Internal,
}

impl ErrorKind {
    /// Stable name used on the wire and in rendered messages
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "ValidationError",
            Self::NotFoundOperation => "NotFoundOperation",
            Self::Auth => "AuthError",
            Self::Connectivity => "ConnectivityError",
            Self::Upstream => "UpstreamError",
            Self::Parse => "ParseError",
            Self::Internal => "InternalError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ScadaError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a not-found error for an unknown tool, prompt, or operation
    pub fn not_found(what: &str, name: &str) -> Self {
        Self::new(ErrorKind::NotFoundOperation, format!("Unknown {what}: {name}"))
    }

    /// Create an auth failure error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    /// Create an auth failure error caused by an upstream rejection
    pub fn auth_rejected(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(ErrorKind::Auth, body)
        }
    }

    /// Create a connectivity error
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connectivity, message)
    }

    /// Create an upstream error carrying the status and body verbatim
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(ErrorKind::Upstream, body)
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl fmt::Display for ScadaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {status}): {}", self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for ScadaError {}

// ============================================================================
// Tool Call Result
// ============================================================================

/// Structured error carried by a failed [`ToolCallResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error category
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// Upstream HTTP status, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<ScadaError> for ToolError {
    fn from(err: ScadaError) -> Self {
        Self {
            kind: err.kind,
            message: err.message,
            status: err.status,
        }
    }
}

/// Outcome of a single tool invocation; produced per call and never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Whether the call succeeded
    pub success: bool,
    /// Structured payload on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Typed failure on error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolCallResult {
    /// Build a successful result
    pub const fn ok(payload: Value) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            error: None,
        }
    }

    /// Build a failed result
    pub fn failed(err: ScadaError) -> Self {
        Self {
            success: false,
            payload: None,
            error: Some(err.into()),
        }
    }

    /// Kind of the carried error, if the call failed
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

impl From<Result<Value, ScadaError>> for ToolCallResult {
    fn from(result: Result<Value, ScadaError>) -> Self {
        match result {
            Ok(payload) => Self::ok(payload),
            Err(err) => Self::failed(err),
        }
    }
}
