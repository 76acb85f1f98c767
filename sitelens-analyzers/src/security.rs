// Passive security checks against a fetched page

use crate::error::Result;
use crate::page::{Page, target_url};
use crate::payload::into_payload;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use sitelens_core::analyzer::{Analyzer, AnalyzerError, AnalyzerKind, AnalyzerOptions, Payload};
use sitelens_core::request::TargetDescriptor;
use sitelens_core::scoring::SECURITY_HEADERS;
use std::collections::BTreeMap;
use tracing::info;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityFinding {
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub remediation: String,
    pub cwe_id: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SslStatus {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityAudit {
    pub url: String,
    pub status_code: u16,
    pub ssl: SslStatus,
    pub headers: BTreeMap<&'static str, bool>,
    pub findings: Vec<SecurityFinding>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

fn header_remediation(header: &str) -> &'static str {
    match header {
        "strict-transport-security" => {
            "Add 'Strict-Transport-Security: max-age=31536000; includeSubDomains' to HTTPS responses."
        }
        "content-security-policy" => {
            "Define a Content-Security-Policy that restricts script and style sources."
        }
        "x-frame-options" => {
            "Add 'X-Frame-Options: DENY' or 'X-Frame-Options: SAMEORIGIN' header to HTTP responses."
        }
        _ => "Add 'X-Content-Type-Options: nosniff' header to HTTP responses.",
    }
}

fn header_cwe(header: &str) -> &'static str {
    match header {
        "strict-transport-security" => "CWE-319",
        "content-security-policy" => "CWE-79",
        "x-frame-options" => "CWE-1021",
        _ => "CWE-16",
    }
}

pub fn check_security_headers(page: &Page) -> (BTreeMap<&'static str, bool>, Vec<SecurityFinding>) {
    let mut present = BTreeMap::new();
    let mut findings = Vec::new();

    for header in SECURITY_HEADERS {
        let found = page.header(header).is_some_and(|v| !v.trim().is_empty());
        present.insert(header, found);

        if !found {
            findings.push(SecurityFinding {
                severity: Severity::Low,
                title: format!("Missing {} header", header),
                description: format!("The {} response header is not set on {}.", header, page.url),
                remediation: header_remediation(header).to_string(),
                cwe_id: header_cwe(header),
            });
        }
    }

    (present, findings)
}

pub fn check_insecure_transport(url: &Url) -> Vec<SecurityFinding> {
    let mut findings = Vec::new();

    if url.scheme() == "http"
        && let Some(host) = url.host_str()
        && !host.starts_with("127.")
        && host != "localhost"
    {
        findings.push(SecurityFinding {
            severity: Severity::Medium,
            title: "Insecure Transport (HTTP)".to_string(),
            description: format!("{} is served over HTTP instead of HTTPS.", url),
            remediation: "Enable HTTPS and redirect all HTTP traffic to HTTPS.".to_string(),
            cwe_id: "CWE-319",
        });
    }

    findings
}

pub fn check_error_messages(page: &Page) -> Vec<SecurityFinding> {
    let mut findings = Vec::new();

    if page.status_code >= 500 && page.status_code < 600 {
        findings.push(SecurityFinding {
            severity: Severity::Low,
            title: format!("Server Error - {}", page.status_code),
            description: format!(
                "Server returned error code {} for {}. Error pages may leak sensitive information.",
                page.status_code, page.url
            ),
            remediation: "Configure custom error pages that don't reveal system details.".to_string(),
            cwe_id: "CWE-209",
        });
    }

    findings
}

pub fn audit_page(page: &Page) -> SecurityAudit {
    let ssl = SslStatus {
        enabled: page.url.scheme() == "https",
    };
    let (headers, header_findings) = check_security_headers(page);

    let mut findings = Vec::new();
    findings.extend(check_insecure_transport(&page.url));
    findings.extend(header_findings);
    findings.extend(check_error_messages(page));

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    if ssl.enabled {
        strengths.push("Site is served over HTTPS".to_string());
    } else {
        weaknesses.push("Site is not served over HTTPS".to_string());
    }

    let present = headers.values().filter(|found| **found).count();
    if present == SECURITY_HEADERS.len() {
        strengths.push("All recommended security headers are set".to_string());
    }

    for finding in &findings {
        if finding.severity != Severity::Info {
            weaknesses.push(finding.title.clone());
        }
    }
    let recommendations = findings.iter().map(|f| f.remediation.clone()).collect();

    SecurityAudit {
        url: page.url.to_string(),
        status_code: page.status_code,
        ssl,
        headers,
        findings,
        strengths,
        weaknesses,
        recommendations,
    }
}

pub struct SecurityAnalyzer {
    client: Client,
}

impl SecurityAnalyzer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn analyze(&self, target: &TargetDescriptor) -> Result<Payload> {
        let url = target_url(target)?;
        let page = Page::fetch(&self.client, url).await?;
        let audit = audit_page(&page);

        info!(
            "Security audit of {}: https={}, {} findings",
            audit.url,
            audit.ssl.enabled,
            audit.findings.len()
        );

        into_payload(&audit)
    }
}

#[async_trait]
impl Analyzer for SecurityAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Security
    }

    async fn invoke(
        &self,
        target: &TargetDescriptor,
        _options: &AnalyzerOptions,
    ) -> std::result::Result<Payload, AnalyzerError> {
        Ok(self.analyze(target).await?)
    }
}
