use crate::error::{Result, ScanError};
use reqwest::Client;
use scraper::Selector;
use sitelens_core::request::TargetDescriptor;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// A fetched page: final URL after redirects, headers and body
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub status_code: u16,
    pub content_type: Option<String>,
    /// Header names are lowercased
    pub headers: BTreeMap<String, String>,
    pub response_time: Duration,
    pub body: String,
}

impl Page {
    pub async fn fetch(client: &Client, url: &Url) -> Result<Self> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = client.get(url.clone()).send().await?;
        let response_time = start.elapsed();

        let final_url = response.url().clone();
        let status_code = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_lowercase(), v.to_string()))
            })
            .collect();
        let content_type = headers.get("content-type").cloned();

        let body = response.text().await?;

        debug!(
            "Fetched {} ({} bytes, status {}) in {:?}",
            final_url,
            body.len(),
            status_code,
            response_time
        );

        Ok(Self {
            url: final_url,
            status_code,
            content_type,
            headers,
            response_time,
            body,
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn is_html(&self) -> bool {
        self.content_type
            .as_ref()
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false)
    }

    /// Fail unless the page is a successful HTML response
    pub fn require_html(self) -> Result<Self> {
        if !self.is_success() {
            return Err(ScanError::StatusError {
                status: self.status_code,
                url: self.url.to_string(),
            });
        }
        if !self.is_html() {
            return Err(ScanError::ParseError(format!(
                "expected HTML from {}, got {}",
                self.url,
                self.content_type.as_deref().unwrap_or("no content type")
            )));
        }
        Ok(self)
    }
}

/// URL of a target, or an error for analyzers that need a website
pub fn target_url(target: &TargetDescriptor) -> Result<&Url> {
    target
        .url()
        .ok_or_else(|| ScanError::UnsupportedTarget(format!("{} has no website URL", target)))
}

pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScanError::ParseError(format!("selector '{}': {}", css, e)))
}
