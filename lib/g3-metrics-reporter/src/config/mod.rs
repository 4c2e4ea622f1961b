/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use anyhow::anyhow;
use base64::prelude::*;
use url::Url;

use crate::{HdrReportMode, Identity, SchemaVersion, TimeUnit, UnitConverter};

#[cfg(feature = "yaml")]
mod yaml;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReporterConfig {
    uri: Option<Url>,
    host: String,
    application: Option<String>,
    instance: Option<String>,
    role: Option<String>,
    description: Option<String>,
    authorization: Option<String>,
    pub deflate: bool,
    pub rate_unit: TimeUnit,
    pub duration_unit: TimeUnit,
    pub skip_unchanged: bool,
    pub hdr_report: HdrReportMode,
    pub schema: SchemaVersion,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        ReporterConfig {
            uri: None,
            host: String::new(),
            application: None,
            instance: None,
            role: None,
            description: None,
            authorization: None,
            deflate: false,
            rate_unit: TimeUnit::Seconds,
            duration_unit: TimeUnit::Milliseconds,
            skip_unchanged: false,
            hdr_report: HdrReportMode::default(),
            schema: SchemaVersion::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

impl ReporterConfig {
    pub fn new(uri: Url, host: &str) -> Self {
        ReporterConfig {
            uri: Some(uri),
            host: host.trim().to_string(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn uri(&self) -> Option<&Url> {
        self.uri.as_ref()
    }

    pub fn set_uri(&mut self, uri: Url) {
        self.uri = Some(uri);
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn set_host(&mut self, host: &str) {
        self.host = host.trim().to_string();
    }

    pub fn set_application(&mut self, application: &str) {
        self.application = non_empty(application);
    }

    pub fn set_instance(&mut self, instance: &str) {
        self.instance = non_empty(instance);
    }

    pub fn set_role(&mut self, role: &str) {
        self.role = non_empty(role);
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = non_empty(description);
    }

    /// Raw value of the `Authorization` header.
    pub fn set_authorization(&mut self, value: &str) {
        self.authorization = non_empty(value);
    }

    pub fn set_basic_authorization(&mut self, username: &str, password: &str) {
        let token = BASE64_STANDARD.encode(format!("{username}:{password}"));
        self.authorization = Some(format!("Basic {token}"));
    }

    #[inline]
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    pub fn identity(&self) -> Identity {
        Identity {
            application: self.application.clone(),
            host: non_empty(&self.host),
            instance: self.instance.clone(),
            role: self.role.clone(),
            description: self.description.clone(),
        }
    }

    pub fn unit_converter(&self) -> UnitConverter {
        UnitConverter::new(self.rate_unit, self.duration_unit)
    }

    pub fn check(&self) -> anyhow::Result<()> {
        let Some(uri) = &self.uri else {
            return Err(anyhow!("no uri has been set"));
        };
        match uri.scheme() {
            "http" | "https" => {}
            s => return Err(anyhow!("unsupported uri scheme {s}")),
        }
        if uri.host_str().is_none() {
            return Err(anyhow!("no host in uri {uri}"));
        }
        if self.host.is_empty() {
            return Err(anyhow!("no host has been set"));
        }
        if self.connect_timeout.is_zero() || self.request_timeout.is_zero() {
            return Err(anyhow!("timeout should not be zero"));
        }
        Ok(())
    }
}
