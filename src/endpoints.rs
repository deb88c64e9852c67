// ABOUTME: Static registry mapping logical SCADA-LTS operations to HTTP method and path template
// ABOUTME: Resolves operation names and renders concrete upstream URLs from path parameters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::fmt;

use reqwest::Url;

use crate::types::ScadaError;

/// Log in and obtain a session token
pub const LOGIN: &str = "login";
/// List all data sources
pub const LIST_DATA_SOURCES: &str = "list_data_sources";
/// List data points, optionally filtered by `dataSourceId`
pub const LIST_DATA_POINTS: &str = "list_data_points";
/// Read the latest value of one data point
pub const READ_POINT_VALUE: &str = "read_point_value";
/// Write the value of a settable data point
pub const WRITE_POINT_VALUE: &str = "write_point_value";
/// List alarms, optionally only the active ones
pub const LIST_ALARMS: &str = "list_alarms";
/// Acknowledge one alarm
pub const ACKNOWLEDGE_ALARM: &str = "acknowledge_alarm";
/// Read system status
pub const SYSTEM_STATUS: &str = "system_status";

/// HTTP methods used by the SCADA-LTS REST surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl HttpMethod {
    /// Equivalent `reqwest` method
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// One upstream endpoint, looked up by logical name and never mutated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// Logical operation name
    pub name: &'static str,
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the base URL; `{name}` marks a placeholder
    pub path_template: &'static str,
    /// Whether a session must be established before calling
    pub requires_auth: bool,
}

const OPERATIONS: &[Operation] = &[
    Operation {
        name: LOGIN,
        method: HttpMethod::Post,
        path_template: "/api/auth/login",
        requires_auth: false,
    },
    Operation {
        name: LIST_DATA_SOURCES,
        method: HttpMethod::Get,
        path_template: "/api/datasources",
        requires_auth: true,
    },
    Operation {
        name: LIST_DATA_POINTS,
        method: HttpMethod::Get,
        path_template: "/api/datapoints",
        requires_auth: true,
    },
    Operation {
        name: READ_POINT_VALUE,
        method: HttpMethod::Get,
        path_template: "/api/point-values/{id}/latest",
        requires_auth: true,
    },
    Operation {
        name: WRITE_POINT_VALUE,
        method: HttpMethod::Post,
        path_template: "/api/point-values/{id}/set",
        requires_auth: true,
    },
    Operation {
        name: LIST_ALARMS,
        method: HttpMethod::Get,
        path_template: "/api/alarms",
        requires_auth: true,
    },
    Operation {
        name: ACKNOWLEDGE_ALARM,
        method: HttpMethod::Post,
        path_template: "/api/alarms/{id}/ack",
        requires_auth: true,
    },
    Operation {
        name: SYSTEM_STATUS,
        method: HttpMethod::Get,
        path_template: "/api/system/status",
        requires_auth: true,
    },
];

/// Look up an operation by logical name
pub fn resolve(name: &str) -> Result<&'static Operation, ScadaError> {
    OPERATIONS
        .iter()
        .find(|op| op.name == name)
        .ok_or_else(|| ScadaError::not_found("operation", name))
}

/// All registered operations, in table order
pub const fn all() -> &'static [Operation] {
    OPERATIONS
}

/// Concrete path of one call, placeholders already filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPath {
    segments: Vec<String>,
}

impl RenderedPath {
    /// Join the path onto `base_url`, percent-encoding each segment
    pub fn url(&self, base_url: &str) -> Result<Url, ScadaError> {
        let mut url = Url::parse(base_url)
            .map_err(|e| ScadaError::validation(format!("Invalid base_url '{base_url}': {e}")))?;

        url.path_segments_mut()
            .map_err(|()| {
                ScadaError::validation(format!("base_url '{base_url}' cannot carry a path"))
            })?
            .pop_if_empty()
            .extend(&self.segments);

        Ok(url)
    }
}

impl Operation {
    /// Fill the path template's `{name}` placeholders from `params`
    ///
    /// Pure; a missing or empty placeholder value is a validation error.
    pub fn render(&self, params: &[(&str, String)]) -> Result<RenderedPath, ScadaError> {
        let mut segments = Vec::new();
        for segment in self.path_template.split('/').filter(|s| !s.is_empty()) {
            match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(key) => {
                    let value = params
                        .iter()
                        .find(|(name, _)| *name == key)
                        .map(|(_, value)| value.trim())
                        .filter(|value| !value.is_empty())
                        .ok_or_else(|| {
                            ScadaError::validation(format!(
                                "Missing path parameter '{key}' for {}",
                                self.name
                            ))
                        })?;
                    segments.push(value.to_owned());
                }
                None => segments.push(segment.to_owned()),
            }
        }
        Ok(RenderedPath { segments })
    }

    /// Build the absolute URL for this operation under `base_url`
    pub fn url(&self, base_url: &str, params: &[(&str, String)]) -> Result<Url, ScadaError> {
        self.render(params)?.url(base_url)
    }
}
