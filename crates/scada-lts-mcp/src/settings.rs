// ABOUTME: Startup settings layering CLI flags over environment variables over the config file
// ABOUTME: Produces the HTTP client config and the optional default SCADA-LTS connection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

use scada_lts::config::{
    parse_timeout, timeout_from_secs, FileConfig, BASE_URL_ENV, PASSWORD_ENV, TIMEOUT_ENV,
    USERNAME_ENV,
};
use scada_lts::{ClientConfig, ConnectionConfig, ScadaError};

/// Connection values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConnectionFlags {
    /// `--base-url`
    pub base_url: Option<String>,
    /// `--username`
    pub username: Option<String>,
    /// `--password`
    pub password: Option<String>,
    /// `--timeout-secs`
    pub timeout_secs: Option<u64>,
}

/// Resolved startup settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// HTTP client settings
    pub client: ClientConfig,
    /// Default connection applied before the first tool call
    pub connection: Option<ConnectionConfig>,
}

/// Layer flags, environment, and file; each field falls through independently
///
/// `env` looks up one variable, returning `None` when unset or blank.
pub fn resolve(
    flags: &ConnectionFlags,
    env: impl Fn(&str) -> Option<String>,
    file: Option<&FileConfig>,
) -> Result<Settings, ScadaError> {
    let file_connection = file.and_then(|f| f.connection.as_ref());

    let timeout = match (flags.timeout_secs, env(TIMEOUT_ENV)) {
        (Some(secs), _) => Some(timeout_from_secs(secs).map_err(|e| {
            ScadaError::validation(format!("Invalid --timeout-secs {secs}: {}", e.message))
        })?),
        (None, Some(raw)) => Some(parse_timeout(&raw).map_err(|e| {
            ScadaError::validation(format!("Invalid {TIMEOUT_ENV} '{raw}': {}", e.message))
        })?),
        (None, None) => match file.and_then(|f| f.timeout_secs) {
            Some(secs) => Some(timeout_from_secs(secs).map_err(|e| {
                ScadaError::validation(format!("Invalid timeout_secs {secs}: {}", e.message))
            })?),
            None => None,
        },
    };
    let client = timeout.map_or_else(ClientConfig::default, |t| {
        ClientConfig::default().with_timeout(t)
    });

    let base_url = flags
        .base_url
        .clone()
        .or_else(|| env(BASE_URL_ENV))
        .or_else(|| file_connection.map(|c| c.base_url.clone()));

    let connection = match base_url {
        Some(base_url) => {
            let username = flags
                .username
                .clone()
                .or_else(|| env(USERNAME_ENV))
                .or_else(|| file_connection.and_then(|c| c.username.clone()));
            let password = flags
                .password
                .clone()
                .or_else(|| env(PASSWORD_ENV))
                .or_else(|| file_connection.and_then(|c| c.password.clone()));
            Some(ConnectionConfig::new(&base_url)?.with_credentials(username, password))
        }
        None => None,
    };

    Ok(Settings { client, connection })
}
