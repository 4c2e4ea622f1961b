/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use url::Url;
use yaml_rust::Yaml;

use super::ReporterConfig;
use crate::{HdrReportMode, SchemaVersion, TimeUnit};

fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

fn text_value(v: &Yaml) -> anyhow::Result<String> {
    match v {
        Yaml::String(s) => Ok(s.clone()),
        Yaml::Integer(i) => Ok(i.to_string()),
        _ => Err(anyhow!("expected a string value")),
    }
}

fn switch_value(v: &Yaml) -> anyhow::Result<bool> {
    match v {
        Yaml::Boolean(b) => Ok(*b),
        Yaml::String(s) => match s.to_lowercase().as_str() {
            "true" | "yes" | "on" => Ok(true),
            "false" | "no" | "off" => Ok(false),
            _ => Err(anyhow!("invalid switch value {s}")),
        },
        _ => Err(anyhow!("expected a boolean value")),
    }
}

/// Humanized duration like `500ms` or `1m`. Bare numbers are seconds.
fn timeout_value(v: &Yaml) -> anyhow::Result<Duration> {
    let timeout = match v {
        Yaml::Integer(secs) => u64::try_from(*secs)
            .map(Duration::from_secs)
            .map_err(|_| anyhow!("negative timeout {secs}"))?,
        Yaml::String(s) => match u64::from_str(s) {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => humanize_rs::duration::parse(s)
                .map_err(|e| anyhow!("invalid duration {s}: {e}"))?,
        },
        _ => return Err(anyhow!("expected a duration value")),
    };
    Ok(timeout)
}

impl TimeUnit {
    fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::String(s) = v {
            TimeUnit::from_str(s)
        } else {
            Err(anyhow!("yaml value type for time unit should be string"))
        }
    }
}

impl HdrReportMode {
    fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::String(s) = v {
            HdrReportMode::from_str(s)
        } else {
            Err(anyhow!("yaml value type for hdr report mode should be string"))
        }
    }
}

impl SchemaVersion {
    fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        match v {
            Yaml::String(s) => match s.to_lowercase().as_str() {
                "legacy" | "v2" | "2" => Ok(SchemaVersion::Legacy),
                "current" | "v3" | "3" => Ok(SchemaVersion::Current),
                _ => Err(anyhow!("invalid schema version: {s}")),
            },
            Yaml::Integer(2) => Ok(SchemaVersion::Legacy),
            Yaml::Integer(3) => Ok(SchemaVersion::Current),
            _ => Err(anyhow!(
                "yaml value type for schema version should be 'string' or 'integer'"
            )),
        }
    }
}

#[derive(Default)]
struct BasicCredential {
    username: Option<String>,
    password: Option<String>,
}

impl ReporterConfig {
    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = v {
            let mut config = ReporterConfig::default();
            let mut credential = BasicCredential::default();
            for (k, v) in map {
                let Yaml::String(k) = k else {
                    return Err(anyhow!("metrics reporter config keys should be strings"));
                };
                config
                    .set_by_yaml_kv(k, v, &mut credential)
                    .context(format!("failed to parse value of key {k}"))?;
            }

            if let Some(username) = credential.username {
                if config.authorization.is_some() {
                    return Err(anyhow!(
                        "username and authorization should not be set at the same time"
                    ));
                }
                let password = credential.password.unwrap_or_default();
                config.set_basic_authorization(&username, &password);
            } else if credential.password.is_some() {
                return Err(anyhow!("password is set but no username"));
            }

            config.check()?;
            Ok(config)
        } else {
            Err(anyhow!(
                "yaml value type for 'metrics reporter config' should be 'map'"
            ))
        }
    }

    fn set_by_yaml_kv(
        &mut self,
        k: &str,
        v: &Yaml,
        credential: &mut BasicCredential,
    ) -> anyhow::Result<()> {
        match normalize_key(k).as_str() {
            "uri" | "url" => {
                let s = text_value(v)?;
                let uri = Url::parse(&s).map_err(|e| anyhow!("invalid url {s}: {e}"))?;
                self.uri = Some(uri);
            }
            "host" => self.set_host(&text_value(v)?),
            "application" | "app" => self.set_application(&text_value(v)?),
            "instance" => self.set_instance(&text_value(v)?),
            "role" => self.set_role(&text_value(v)?),
            "description" => self.set_description(&text_value(v)?),
            "authorization" => self.set_authorization(&text_value(v)?),
            "username" => credential.username = Some(text_value(v)?),
            "password" => credential.password = Some(text_value(v)?),
            "deflate" => self.deflate = switch_value(v)?,
            "rate_unit" | "rateunit" => self.rate_unit = TimeUnit::parse_yaml(v)?,
            "duration_unit" | "durationunit" => self.duration_unit = TimeUnit::parse_yaml(v)?,
            "skip_unchanged" | "skipunchanged" => self.skip_unchanged = switch_value(v)?,
            "hdr_report" | "hdrreport" => self.hdr_report = HdrReportMode::parse_yaml(v)?,
            "schema" | "schema_version" => self.schema = SchemaVersion::parse_yaml(v)?,
            "connect_timeout" => self.connect_timeout = timeout_value(v)?,
            "request_timeout" | "timeout" => self.request_timeout = timeout_value(v)?,
            _ => return Err(anyhow!("invalid key {k}")),
        }
        Ok(())
    }
}
