// ABOUTME: Typed tool requests validated from loosely-typed JSON argument bags
// ABOUTME: Coerces ids, flags, and point values before any network call and maps each tool to its upstream operation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::fmt;

use serde::Serialize;
use serde_json::{json, Number, Value};

use crate::config::ConnectionConfig;
use crate::endpoints::{
    ACKNOWLEDGE_ALARM, LIST_ALARMS, LIST_DATA_POINTS, LIST_DATA_SOURCES, READ_POINT_VALUE,
    SYSTEM_STATUS, WRITE_POINT_VALUE,
};
use crate::executor::RequestPayload;
use crate::types::ScadaError;

/// Replace the connection config and reset the session
pub const CONFIGURE_CONNECTION: &str = "configure_connection";
/// List data sources
pub const GET_DATA_SOURCES: &str = "get_data_sources";
/// List data points
pub const GET_DATA_POINTS: &str = "get_data_points";
/// Read one point value
pub const GET_POINT_VALUE: &str = "get_point_value";
/// Write one point value
pub const SET_POINT_VALUE: &str = "set_point_value";
/// List alarms
pub const GET_ALARMS: &str = "get_alarms";
/// Acknowledge one alarm
pub const ACKNOWLEDGE_ALARM_TOOL: &str = "acknowledge_alarm";
/// Read system status
pub const GET_SYSTEM_STATUS: &str = "get_system_status";

/// Every tool name the dispatcher accepts
pub const TOOL_NAMES: &[&str] = &[
    CONFIGURE_CONNECTION,
    GET_DATA_SOURCES,
    GET_DATA_POINTS,
    GET_POINT_VALUE,
    SET_POINT_VALUE,
    GET_ALARMS,
    ACKNOWLEDGE_ALARM_TOOL,
    GET_SYSTEM_STATUS,
];

// ============================================================================
// Point Values
// ============================================================================

/// SCADA-LTS data point types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// On/off
    Binary,
    /// Integer state code
    Multistate,
    /// Floating point measurement
    Numeric,
    /// Free text
    Alphanumeric,
}

impl DataType {
    /// Parse a data type name, case-insensitively
    pub fn parse(name: &str) -> Result<Self, ScadaError> {
        match name.trim().to_lowercase().as_str() {
            "binary" => Ok(Self::Binary),
            "multistate" => Ok(Self::Multistate),
            "numeric" => Ok(Self::Numeric),
            "alphanumeric" => Ok(Self::Alphanumeric),
            other => Err(ScadaError::validation(format!(
                "Unknown data_type '{other}'. Valid: binary, multistate, numeric, alphanumeric"
            ))),
        }
    }
}

/// A value to write to a data point, already coerced to its wire type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PointValue {
    /// Binary point value
    Binary(bool),
    /// Multistate point value
    Multistate(i64),
    /// Numeric point value
    Numeric(Number),
    /// Alphanumeric point value
    Alphanumeric(String),
}

impl fmt::Display for PointValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary(b) => write!(f, "{b}"),
            Self::Multistate(n) => write!(f, "{n}"),
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Alphanumeric(s) => write!(f, "{s:?}"),
        }
    }
}

impl PointValue {
    /// Coerce a raw JSON value, honouring the point's declared type when given
    pub fn coerce(value: &Value, data_type: Option<DataType>) -> Result<Self, ScadaError> {
        match data_type {
            None => match value {
                Value::Bool(b) => Ok(Self::Binary(*b)),
                Value::Number(n) => Ok(Self::Numeric(n.clone())),
                Value::String(s) => Ok(Self::Alphanumeric(s.clone())),
                _ => Err(ScadaError::validation(
                    "'value' must be a number, boolean, or string",
                )),
            },
            Some(DataType::Numeric) => coerce_number(value).map(Self::Numeric).ok_or_else(|| {
                ScadaError::validation(format!("Numeric point requires a number, got {value}"))
            }),
            Some(DataType::Binary) => coerce_binary(value).map(Self::Binary).ok_or_else(|| {
                ScadaError::validation(format!(
                    "Binary point requires true/false or 0/1, got {value}"
                ))
            }),
            Some(DataType::Multistate) => {
                coerce_i64(value).map(Self::Multistate).ok_or_else(|| {
                    ScadaError::validation(format!(
                        "Multistate point requires an integer state, got {value}"
                    ))
                })
            }
            Some(DataType::Alphanumeric) => match value {
                Value::String(s) => Ok(Self::Alphanumeric(s.clone())),
                Value::Number(n) => Ok(Self::Alphanumeric(n.to_string())),
                Value::Bool(b) => Ok(Self::Alphanumeric(b.to_string())),
                _ => Err(ScadaError::validation(format!(
                    "Alphanumeric point requires text, got {value}"
                ))),
            },
        }
    }
}

fn coerce_number(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .map(Number::from)
                .or_else(|| s.parse::<f64>().ok().and_then(Number::from_f64))
        }
        _ => None,
    }
}

fn coerce_binary(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && (f - f.trunc()).abs() < f64::EPSILON)
                .filter(|f| *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

// ============================================================================
// Argument Access
// ============================================================================

/// Read-only view over a tool's argument object
struct Arguments<'a> {
    tool: &'a str,
    map: Option<&'a serde_json::Map<String, Value>>,
}

impl<'a> Arguments<'a> {
    fn new(tool: &'a str, arguments: &'a Value) -> Result<Self, ScadaError> {
        match arguments {
            Value::Null => Ok(Self { tool, map: None }),
            Value::Object(map) => Ok(Self {
                tool,
                map: Some(map),
            }),
            other => Err(ScadaError::validation(format!(
                "{tool}: arguments must be an object, got {other}"
            ))),
        }
    }

    /// Field value, treating explicit `null` as absent
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.and_then(|m| m.get(key)).filter(|v| !v.is_null())
    }

    fn required(&self, key: &str) -> Result<&'a Value, ScadaError> {
        self.get(key).ok_or_else(|| {
            ScadaError::validation(format!("{}: missing required argument '{key}'", self.tool))
        })
    }

    fn integer(&self, key: &str) -> Result<i64, ScadaError> {
        let value = self.required(key)?;
        coerce_i64(value).ok_or_else(|| self.type_error(key, "an integer", value))
    }

    fn optional_integer(&self, key: &str) -> Result<Option<i64>, ScadaError> {
        self.get(key)
            .map(|value| coerce_i64(value).ok_or_else(|| self.type_error(key, "an integer", value)))
            .transpose()
    }

    fn optional_bool(&self, key: &str) -> Result<Option<bool>, ScadaError> {
        self.get(key)
            .map(|value| coerce_bool(value).ok_or_else(|| self.type_error(key, "a boolean", value)))
            .transpose()
    }

    fn string(&self, key: &str) -> Result<&'a str, ScadaError> {
        let value = self.required(key)?;
        value
            .as_str()
            .ok_or_else(|| self.type_error(key, "a string", value))
    }

    fn optional_string(&self, key: &str) -> Result<Option<String>, ScadaError> {
        self.get(key)
            .map(|value| {
                value
                    .as_str()
                    .map(ToOwned::to_owned)
                    .ok_or_else(|| self.type_error(key, "a string", value))
            })
            .transpose()
    }

    fn type_error(&self, key: &str, expected: &str, got: &Value) -> ScadaError {
        ScadaError::validation(format!(
            "{}: argument '{key}' must be {expected}, got {got}",
            self.tool
        ))
    }
}

// ============================================================================
// Tool Requests
// ============================================================================

/// A validated tool invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    /// Replace the connection config
    ConfigureConnection(ConnectionConfig),
    /// List data sources
    GetDataSources,
    /// List data points, optionally for one data source
    GetDataPoints {
        /// Data source filter
        data_source_id: Option<i64>,
    },
    /// Read a point's latest value
    GetPointValue {
        /// Data point id
        point_id: i64,
    },
    /// Write a point's value
    SetPointValue {
        /// Data point id
        point_id: i64,
        /// Coerced value
        value: PointValue,
    },
    /// List alarms
    GetAlarms {
        /// Only active alarms (defaults to true)
        active_only: bool,
    },
    /// Acknowledge an alarm
    AcknowledgeAlarm {
        /// Alarm id
        alarm_id: i64,
    },
    /// Read system status
    GetSystemStatus,
}

/// Upstream call a tool request translates to
#[derive(Debug, Clone)]
pub struct UpstreamCall {
    /// Logical operation name in the endpoint registry
    pub operation: &'static str,
    /// Path placeholder values
    pub path_params: Vec<(&'static str, String)>,
    /// Query string and body
    pub payload: RequestPayload,
}

impl ToolRequest {
    /// Validate a named tool invocation into a typed request
    ///
    /// Performs no I/O. Unknown names yield `NotFoundOperation`; bad or
    /// missing arguments yield `Validation`.
    pub fn parse(tool_name: &str, arguments: &Value) -> Result<Self, ScadaError> {
        if !TOOL_NAMES.contains(&tool_name) {
            return Err(ScadaError::not_found("tool", tool_name));
        }
        let args = Arguments::new(tool_name, arguments)?;

        let request = match tool_name {
            CONFIGURE_CONNECTION => {
                let config = ConnectionConfig::new(args.string("base_url")?)?.with_credentials(
                    args.optional_string("username")?,
                    args.optional_string("password")?,
                );
                Self::ConfigureConnection(config)
            }
            GET_DATA_SOURCES => Self::GetDataSources,
            GET_DATA_POINTS => Self::GetDataPoints {
                data_source_id: args.optional_integer("data_source_id")?,
            },
            GET_POINT_VALUE => Self::GetPointValue {
                point_id: args.integer("point_id")?,
            },
            SET_POINT_VALUE => {
                let point_id = args.integer("point_id")?;
                let data_type = args
                    .optional_string("data_type")?
                    .as_deref()
                    .map(DataType::parse)
                    .transpose()?;
                let value = PointValue::coerce(args.required("value")?, data_type)?;
                Self::SetPointValue { point_id, value }
            }
            GET_ALARMS => Self::GetAlarms {
                active_only: args.optional_bool("active_only")?.unwrap_or(true),
            },
            ACKNOWLEDGE_ALARM_TOOL => Self::AcknowledgeAlarm {
                alarm_id: args.integer("alarm_id")?,
            },
            GET_SYSTEM_STATUS => Self::GetSystemStatus,
            other => return Err(ScadaError::not_found("tool", other)),
        };
        Ok(request)
    }

    /// Tool name this request was parsed from
    pub const fn tool_name(&self) -> &'static str {
        match self {
            Self::ConfigureConnection(_) => CONFIGURE_CONNECTION,
            Self::GetDataSources => GET_DATA_SOURCES,
            Self::GetDataPoints { .. } => GET_DATA_POINTS,
            Self::GetPointValue { .. } => GET_POINT_VALUE,
            Self::SetPointValue { .. } => SET_POINT_VALUE,
            Self::GetAlarms { .. } => GET_ALARMS,
            Self::AcknowledgeAlarm { .. } => ACKNOWLEDGE_ALARM_TOOL,
            Self::GetSystemStatus => GET_SYSTEM_STATUS,
        }
    }

    /// Upstream call for this request; `None` for `configure_connection`
    pub fn upstream_call(&self) -> Option<UpstreamCall> {
        let call = |operation, path_params, payload| {
            Some(UpstreamCall {
                operation,
                path_params,
                payload,
            })
        };

        match self {
            Self::ConfigureConnection(_) => None,
            Self::GetDataSources => call(LIST_DATA_SOURCES, Vec::new(), RequestPayload::new()),
            Self::GetDataPoints { data_source_id } => {
                let mut payload = RequestPayload::new();
                if let Some(id) = data_source_id {
                    payload = payload.with_query("dataSourceId", id.to_string());
                }
                call(LIST_DATA_POINTS, Vec::new(), payload)
            }
            Self::GetPointValue { point_id } => call(
                READ_POINT_VALUE,
                vec![("id", point_id.to_string())],
                RequestPayload::new(),
            ),
            Self::SetPointValue { point_id, value } => call(
                WRITE_POINT_VALUE,
                vec![("id", point_id.to_string())],
                RequestPayload::new().with_body(json!({ "value": value })),
            ),
            Self::GetAlarms { active_only } => {
                let mut payload = RequestPayload::new();
                if *active_only {
                    payload = payload.with_query("active", "true");
                }
                call(LIST_ALARMS, Vec::new(), payload)
            }
            Self::AcknowledgeAlarm { alarm_id } => call(
                ACKNOWLEDGE_ALARM,
                vec![("id", alarm_id.to_string())],
                RequestPayload::new(),
            ),
            Self::GetSystemStatus => call(SYSTEM_STATUS, Vec::new(), RequestPayload::new()),
        }
    }
}
