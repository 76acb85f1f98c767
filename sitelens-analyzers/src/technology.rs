// Technology fingerprinting from response headers and HTML markers

use crate::error::Result;
use crate::page::{Page, target_url};
use crate::payload::into_payload;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use sitelens_core::analyzer::{Analyzer, AnalyzerError, AnalyzerKind, AnalyzerOptions, Payload};
use sitelens_core::request::TargetDescriptor;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Technology {
    pub name: String,
    pub category: &'static str,
    pub evidence: String,
}

/// (name, category, lowercase marker searched in the HTML)
const HTML_FINGERPRINTS: &[(&str, &str, &str)] = &[
    ("WordPress", "cms", "wp-content/"),
    ("Shopify", "ecommerce", "cdn.shopify.com"),
    ("Next.js", "framework", "__next_data__"),
    ("React", "javascript_library", "data-reactroot"),
    ("Vue.js", "javascript_framework", "data-v-app"),
    ("Angular", "javascript_framework", "ng-version"),
    ("jQuery", "javascript_library", "jquery"),
    ("Google Analytics", "analytics", "googletagmanager.com/gtag"),
    ("Google Analytics", "analytics", "google-analytics.com"),
];

#[derive(Debug, Clone, Serialize)]
pub struct TechnologyReport {
    pub technologies: Vec<Technology>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

fn push_unique(found: &mut Vec<Technology>, technology: Technology) {
    if !found.iter().any(|t| t.name == technology.name) {
        debug!("Detected {} ({})", technology.name, technology.evidence);
        found.push(technology);
    }
}

pub fn fingerprint(page: &Page) -> Vec<Technology> {
    let mut found = Vec::new();

    if let Some(server) = page.header("server") {
        let name = server.split('/').next().unwrap_or(server).trim();
        if name.eq_ignore_ascii_case("cloudflare") {
            push_unique(
                &mut found,
                Technology {
                    name: "Cloudflare".to_string(),
                    category: "cdn",
                    evidence: format!("server: {}", server),
                },
            );
        } else if !name.is_empty() {
            push_unique(
                &mut found,
                Technology {
                    name: name.to_string(),
                    category: "web_server",
                    evidence: format!("server: {}", server),
                },
            );
        }
    }

    if page.header("cf-ray").is_some() {
        push_unique(
            &mut found,
            Technology {
                name: "Cloudflare".to_string(),
                category: "cdn",
                evidence: "cf-ray header".to_string(),
            },
        );
    }

    if let Some(powered_by) = page.header("x-powered-by") {
        push_unique(
            &mut found,
            Technology {
                name: powered_by.trim().to_string(),
                category: "platform",
                evidence: format!("x-powered-by: {}", powered_by),
            },
        );
    }

    let html = page.body.to_lowercase();
    for (name, category, marker) in HTML_FINGERPRINTS {
        if html.contains(*marker) {
            push_unique(
                &mut found,
                Technology {
                    name: name.to_string(),
                    category: *category,
                    evidence: format!("html contains '{}'", marker),
                },
            );
        }
    }

    found
}

pub fn summarize(page: &Page) -> TechnologyReport {
    let technologies = fingerprint(page);
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut recommendations = Vec::new();

    if technologies.iter().any(|t| t.category == "analytics") {
        strengths.push("Visitor analytics installed".to_string());
    } else {
        recommendations.push("Install an analytics tool to measure visitor behaviour".to_string());
    }

    if technologies.iter().any(|t| t.category == "cdn") {
        strengths.push("Content served through a CDN".to_string());
    }

    if let Some(powered_by) = page.header("x-powered-by") {
        weaknesses.push(format!("Server discloses its platform ({})", powered_by));
        recommendations.push("Remove the X-Powered-By header".to_string());
    }

    TechnologyReport {
        technologies,
        strengths,
        weaknesses,
        recommendations,
    }
}

pub struct TechnologyAnalyzer {
    client: Client,
}

impl TechnologyAnalyzer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn analyze(&self, target: &TargetDescriptor) -> Result<Payload> {
        let url = target_url(target)?;
        let page = Page::fetch(&self.client, url).await?;
        let report = summarize(&page);

        info!(
            "Detected {} technologies on {}",
            report.technologies.len(),
            page.url
        );

        into_payload(&report)
    }
}

#[async_trait]
impl Analyzer for TechnologyAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Technology
    }

    async fn invoke(
        &self,
        target: &TargetDescriptor,
        _options: &AnalyzerOptions,
    ) -> std::result::Result<Payload, AnalyzerError> {
        Ok(self.analyze(target).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::default_client;
    use std::time::Duration;
    use url::Url;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn page(headers: &[(&str, &str)], body: &str) -> Page {
        Page {
            url: Url::parse("https://example.com/").unwrap(),
            status_code: 200,
            content_type: Some("text/html".to_string()),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            response_time: Duration::from_millis(80),
            body: body.to_string(),
        }
    }

    fn names(technologies: &[Technology]) -> Vec<&str> {
        technologies.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_header_fingerprints() {
        let found = fingerprint(&page(
            &[("server", "nginx/1.25.3"), ("x-powered-by", "PHP/8.2")],
            "",
        ));
        assert_eq!(names(&found), vec!["nginx", "PHP/8.2"]);
        assert_eq!(found[0].category, "web_server");
    }

    #[test]
    fn test_cloudflare_detected_once() {
        let found = fingerprint(&page(&[("server", "cloudflare"), ("cf-ray", "8a1b2c")], ""));
        assert_eq!(names(&found), vec!["Cloudflare"]);
    }

    #[test]
    fn test_html_fingerprints() {
        let body = r#"<html><head>
            <link rel="stylesheet" href="/wp-content/themes/site/style.css">
            <script src="https://code.jquery.com/jquery-3.7.1.min.js"></script>
            <script async src="https://www.googletagmanager.com/gtag/js?id=G-1"></script>
            <script src="https://www.google-analytics.com/analytics.js"></script>
            </head></html>"#;
        let found = fingerprint(&page(&[], body));
        assert_eq!(names(&found), vec!["WordPress", "jQuery", "Google Analytics"]);
    }

    #[test]
    fn test_summary_findings() {
        let report = summarize(&page(&[("x-powered-by", "Express")], "<html></html>"));
        assert!(report.weaknesses[0].contains("Express"));
        assert!(report.recommendations.contains(&"Remove the X-Powered-By header".to_string()));
        assert!(
            report
                .recommendations
                .contains(&"Install an analytics tool to measure visitor behaviour".to_string())
        );
    }

    #[tokio::test]
    async fn test_invoke_lists_technologies() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .insert_header("server", "Apache")
                    .set_body_bytes(br#"<div id="app" data-v-app></div>"#.as_slice()),
            )
            .mount(&mock_server)
            .await;

        let analyzer = TechnologyAnalyzer::new(default_client().unwrap());
        let target = TargetDescriptor::parse_url(&mock_server.uri()).unwrap();
        let payload = analyzer.invoke(&target, &AnalyzerOptions::new()).await.unwrap();

        let technologies = payload["technologies"].as_array().unwrap();
        assert_eq!(technologies.len(), 2);
        assert_eq!(technologies[0]["name"], "Apache");
        assert_eq!(technologies[1]["name"], "Vue.js");
    }
}
