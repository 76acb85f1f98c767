//! PageSpeed Insights performance adapter.
//!
//! Calls the v5 `runPagespeed` endpoint with the mobile strategy and turns the
//! Lighthouse result into the payload the engine reads: `performance_score`
//! (0-100), `load_time` in seconds (time to interactive) and paint metrics.

use crate::error::{Result, ScanError};
use crate::page::target_url;
use crate::payload::into_payload;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sitelens_core::analyzer::{Analyzer, AnalyzerError, AnalyzerKind, AnalyzerOptions, Payload};
use sitelens_core::request::TargetDescriptor;
use std::collections::HashMap;
use tracing::{debug, info};

pub const DEFAULT_PAGESPEED_ENDPOINT: &str =
    "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

const STRATEGY: &str = "mobile";

const FAST_FCP_SECS: f64 = 1.8;
const SLOW_FCP_SECS: f64 = 3.0;
const FAST_LCP_SECS: f64 = 2.5;
const SLOW_LCP_SECS: f64 = 4.0;

#[derive(Debug, Deserialize)]
struct PageSpeedResponse {
    #[serde(rename = "lighthouseResult")]
    lighthouse_result: LighthouseResult,
}

#[derive(Debug, Deserialize)]
struct LighthouseResult {
    categories: Categories,
    #[serde(default)]
    audits: HashMap<String, Audit>,
}

#[derive(Debug, Deserialize)]
struct Categories {
    performance: Category,
}

#[derive(Debug, Deserialize)]
struct Category {
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Audit {
    #[serde(rename = "numericValue")]
    numeric_value: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub performance_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_contentful_paint: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_contentful_paint: Option<f64>,
    pub strategy: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

fn audit_secs(audits: &HashMap<String, Audit>, name: &str) -> Option<f64> {
    audits
        .get(name)
        .and_then(|audit| audit.numeric_value)
        .filter(|ms| ms.is_finite() && *ms >= 0.0)
        .map(|ms| ms / 1000.0)
}

/// Convert a raw PageSpeed response body into a performance report
pub fn parse_pagespeed(body: &str, strategy: &str) -> Result<PerformanceReport> {
    let response: PageSpeedResponse = serde_json::from_str(body)?;
    let lighthouse = response.lighthouse_result;

    let score = lighthouse
        .categories
        .performance
        .score
        .filter(|s| s.is_finite())
        .ok_or_else(|| ScanError::ParseError("performance category has no score".to_string()))?;

    let mut report = PerformanceReport {
        performance_score: (score * 100.0).round(),
        load_time: audit_secs(&lighthouse.audits, "interactive"),
        first_contentful_paint: audit_secs(&lighthouse.audits, "first-contentful-paint"),
        largest_contentful_paint: audit_secs(&lighthouse.audits, "largest-contentful-paint"),
        strategy: strategy.to_string(),
        strengths: Vec::new(),
        weaknesses: Vec::new(),
        recommendations: Vec::new(),
    };

    if let Some(fcp) = report.first_contentful_paint {
        if fcp <= FAST_FCP_SECS {
            report
                .strengths
                .push(format!("Fast first contentful paint ({:.1}s)", fcp));
        } else if fcp > SLOW_FCP_SECS {
            report
                .weaknesses
                .push(format!("Slow first contentful paint ({:.1}s)", fcp));
            report
                .recommendations
                .push("Eliminate render-blocking resources and inline critical CSS".to_string());
        }
    }

    if let Some(lcp) = report.largest_contentful_paint {
        if lcp <= FAST_LCP_SECS {
            report
                .strengths
                .push(format!("Fast largest contentful paint ({:.1}s)", lcp));
        } else if lcp > SLOW_LCP_SECS {
            report
                .weaknesses
                .push(format!("Slow largest contentful paint ({:.1}s)", lcp));
            report
                .recommendations
                .push("Serve hero images in modern formats and preload the largest element".to_string());
        }
    }

    Ok(report)
}

pub struct PerformanceAnalyzer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl PerformanceAnalyzer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoint: DEFAULT_PAGESPEED_ENDPOINT.to_string(),
            api_key: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub async fn analyze(&self, target: &TargetDescriptor) -> Result<Payload> {
        let url = target_url(target)?;

        let mut query = vec![
            ("url", url.as_str().to_string()),
            ("strategy", STRATEGY.to_string()),
            ("category", "performance".to_string()),
        ];
        if let Some(ref key) = self.api_key {
            query.push(("key", key.clone()));
        }

        debug!("Requesting PageSpeed report for {}", url);
        let response = self.client.get(&self.endpoint).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::StatusError {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let body = response.text().await?;
        let report = parse_pagespeed(&body, STRATEGY)?;

        info!(
            "PageSpeed score for {}: {} (interactive {:?}s)",
            url, report.performance_score, report.load_time
        );

        into_payload(&report)
    }
}

#[async_trait]
impl Analyzer for PerformanceAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Performance
    }

    async fn invoke(
        &self,
        target: &TargetDescriptor,
        _options: &AnalyzerOptions,
    ) -> std::result::Result<Payload, AnalyzerError> {
        Ok(self.analyze(target).await?)
    }
}
