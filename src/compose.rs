// ABOUTME: Prompt composition turning high-level prompt parameters into narrative SCADA summaries
// ABOUTME: Fans out upstream reads concurrently and degrades each failed section to an inline notice
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

//! # Prompt Composer
//!
//! Two prompts are supported:
//!
//! - [`SYSTEM_OVERVIEW`]: status, data sources, data points, and optionally
//!   active alarms, fetched concurrently.
//! - [`DATA_POINT_ANALYSIS`]: one data source, its points, and the latest
//!   value of each point (at most [`MAX_CONCURRENT_READS`] reads in flight).
//!
//! A failed upstream read never aborts the prompt; the section reads
//! `section unavailable: <reason>` instead.

use std::collections::HashMap;
use std::fmt::Write as _;

use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::ScadaClient;
use crate::types::ScadaError;

/// System overview prompt name
pub const SYSTEM_OVERVIEW: &str = "scada_system_overview";

/// Data source analysis prompt name
pub const DATA_POINT_ANALYSIS: &str = "data_point_analysis";

/// Every prompt name the composer accepts
pub const PROMPT_NAMES: &[&str] = &[SYSTEM_OVERVIEW, DATA_POINT_ANALYSIS];

/// Upper bound on concurrent point-value reads in one analysis
pub const MAX_CONCURRENT_READS: usize = 4;

/// A validated prompt request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRequest {
    /// System overview
    SystemOverview {
        /// Whether to append the active alarms section
        include_alarms: bool,
    },
    /// Analysis of one data source
    DataPointAnalysis {
        /// Data source to analyse
        data_source_id: i64,
    },
}

impl PromptRequest {
    /// Validate prompt arguments, which always arrive as strings
    pub fn parse(name: &str, arguments: &HashMap<String, String>) -> Result<Self, ScadaError> {
        match name {
            SYSTEM_OVERVIEW => {
                let flag = arguments
                    .get("include_alarms")
                    .map(String::as_str)
                    .map(str::trim);
                let include_alarms = match flag {
                    None | Some("") => false,
                    Some(raw) => parse_flag(raw).ok_or_else(|| {
                        ScadaError::validation(format!(
                            "include_alarms must be true or false, got '{raw}'"
                        ))
                    })?,
                };
                Ok(Self::SystemOverview { include_alarms })
            }
            DATA_POINT_ANALYSIS => {
                let raw = arguments
                    .get("data_source_id")
                    .map(String::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        ScadaError::validation("Missing required argument 'data_source_id'")
                    })?;
                let data_source_id = raw.parse::<i64>().map_err(|_| {
                    ScadaError::validation(format!(
                        "data_source_id must be an integer, got '{raw}'"
                    ))
                })?;
                Ok(Self::DataPointAnalysis { data_source_id })
            }
            other => Err(ScadaError::not_found("prompt", other)),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Rendered prompt: a short description and the narrative text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    /// One-line description of what the text covers
    pub description: String,
    /// Markdown narrative
    pub text: String,
}

impl ComposedPrompt {
    fn new(description: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            text: text.into(),
        }
    }
}

/// Validate and compose a named prompt
///
/// Unknown names and bad arguments are errors. Upstream failures are not:
/// they are folded into the text.
pub async fn compose(
    client: &ScadaClient,
    name: &str,
    arguments: &HashMap<String, String>,
) -> Result<ComposedPrompt, ScadaError> {
    let request = PromptRequest::parse(name, arguments)?;
    Ok(compose_request(client, request).await)
}

/// Compose an already validated prompt
pub async fn compose_request(client: &ScadaClient, request: PromptRequest) -> ComposedPrompt {
    if !client.session().is_configured().await {
        return ComposedPrompt::new(
            "SCADA-LTS client not configured",
            "Please configure the SCADA-LTS connection first using the configure_connection tool.",
        );
    }

    match request {
        PromptRequest::SystemOverview { include_alarms } => {
            system_overview(client, include_alarms).await
        }
        PromptRequest::DataPointAnalysis { data_source_id } => {
            data_point_analysis(client, data_source_id).await
        }
    }
}

async fn system_overview(client: &ScadaClient, include_alarms: bool) -> ComposedPrompt {
    let alarms = async {
        if include_alarms {
            Some(client.alarms(true).await)
        } else {
            None
        }
    };
    let (status, sources, points, alarms) = tokio::join!(
        client.system_status(),
        client.data_sources(),
        client.data_points(None),
        alarms
    );

    let mut text = String::from("# SCADA-LTS System Overview\n");
    push_section(&mut text, "System Status", &status);
    push_counted_section(&mut text, "Data Sources", &sources);
    push_counted_section(&mut text, "Data Points", &points);
    if let Some(alarms) = alarms {
        push_counted_section(&mut text, "Active Alarms", &alarms);
    }

    ComposedPrompt::new("SCADA-LTS system overview", text)
}

async fn data_point_analysis(client: &ScadaClient, data_source_id: i64) -> ComposedPrompt {
    let sources = client.data_sources().await;

    let source = match &sources {
        Ok(list) => match find_by_id(list, data_source_id) {
            Some(source) => Ok(source.clone()),
            None => {
                return ComposedPrompt::new(
                    "Data source not found",
                    format!("Data source with ID {data_source_id} not found."),
                );
            }
        },
        Err(e) => Err(e.clone()),
    };

    let points = client.data_points(Some(data_source_id)).await;
    let values = match &points {
        Ok(list) => Ok(current_values(client, list).await),
        Err(e) => Err(e.clone()),
    };

    let name = source
        .as_ref()
        .ok()
        .and_then(|s| s.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("Unknown");

    let mut text = format!("# Data Source Analysis: {name}\n");
    push_section(&mut text, "Data Source Details", &source);
    push_counted_section(&mut text, "Data Points", &points);
    push_section(&mut text, "Current Values", &values);

    ComposedPrompt::new(format!("Analysis of data source {data_source_id}"), text)
}

/// Read the latest value of every point carrying an integer `id`
async fn current_values(client: &ScadaClient, points: &Value) -> Value {
    let ids: Vec<i64> = points
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|p| p.get("id").and_then(Value::as_i64))
                .collect()
        })
        .unwrap_or_default();
    debug!(count = ids.len(), "Reading current point values");

    let readings: Vec<(i64, Result<Value, ScadaError>)> = stream::iter(ids)
        .map(|id| async move { (id, client.point_value(id).await) })
        .buffered(MAX_CONCURRENT_READS)
        .collect()
        .await;

    let mut values = Map::new();
    for (id, reading) in readings {
        let value = reading.unwrap_or_else(|e| Value::String(format!("unavailable: {e}")));
        values.insert(id.to_string(), value);
    }
    Value::Object(values)
}

fn find_by_id(list: &Value, id: i64) -> Option<&Value> {
    list.as_array()?
        .iter()
        .find(|item| item.get("id").and_then(Value::as_i64) == Some(id))
}

fn item_count(value: &Value) -> usize {
    value.as_array().map_or(0, Vec::len)
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn push_section(text: &mut String, title: &str, result: &Result<Value, ScadaError>) {
    let _ = write!(text, "\n## {title}\n");
    push_body(text, result);
}

fn push_counted_section(text: &mut String, title: &str, result: &Result<Value, ScadaError>) {
    match result {
        Ok(value) => {
            let _ = write!(text, "\n## {title} ({} total)\n", item_count(value));
        }
        Err(_) => {
            let _ = write!(text, "\n## {title}\n");
        }
    }
    push_body(text, result);
}

fn push_body(text: &mut String, result: &Result<Value, ScadaError>) {
    match result {
        Ok(value) => {
            text.push_str(&pretty(value));
            text.push('\n');
        }
        Err(e) => {
            let _ = writeln!(text, "section unavailable: {e}");
        }
    }
}
