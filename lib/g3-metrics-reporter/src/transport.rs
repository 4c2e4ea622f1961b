/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, anyhow};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use reqwest::blocking::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::redirect;
use url::Url;

use crate::config::ReporterConfig;
use crate::error::TransportError;
use crate::stats::ReporterStats;

pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";
const DEFLATE_ENCODING: &str = "deflate";

/// Zlib wrapped deflate at the best compression level.
pub fn deflate(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

pub struct HttpTransport {
    client: Client,
    uri: Url,
    static_headers: HeaderMap,
    deflate: bool,
    stats: Arc<ReporterStats>,
}

impl HttpTransport {
    pub fn new(config: &ReporterConfig, stats: Arc<ReporterStats>) -> anyhow::Result<Self> {
        let uri = config
            .uri()
            .cloned()
            .ok_or_else(|| anyhow!("no uri has been set"))?;

        let mut static_headers = HeaderMap::new();
        static_headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(PROTOBUF_CONTENT_TYPE),
        );
        if let Some(auth) = config.authorization() {
            let mut value = HeaderValue::from_str(auth)
                .map_err(|e| anyhow!("invalid authorization header value: {e}"))?;
            value.set_sensitive(true);
            static_headers.insert(header::AUTHORIZATION, value);
        }
        if config.deflate {
            static_headers.insert(
                header::CONTENT_ENCODING,
                HeaderValue::from_static(DEFLATE_ENCODING),
            );
        }

        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .context("failed to build http client")?;

        Ok(HttpTransport {
            client,
            uri,
            static_headers,
            deflate: config.deflate,
            stats,
        })
    }

    #[inline]
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// PUT the encoded report and return the response status code.
    ///
    /// The response body is always read to the end.
    pub fn send(&self, body: Vec<u8>) -> Result<u16, TransportError> {
        let _timer = self.stats.reports().time();

        let body = if self.deflate { deflate(&body)? } else { body };
        self.stats.report_size().update(body.len() as u64);

        let mut rsp = self
            .client
            .put(self.uri.clone())
            .headers(self.static_headers.clone())
            .body(body)
            .send()?;
        let status = rsp.status().as_u16();
        rsp.copy_to(&mut io::sink())?;
        Ok(status)
    }
}
