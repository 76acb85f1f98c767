// End-to-end runs of the orchestrator with the HTTP analyzers against mock servers

use serde_json::json;
use sitelens_analyzers::{AnalyzerConfig, default_analyzers};
use sitelens_core::dimension::Dimension;
use sitelens_core::orchestrator::Orchestrator;
use sitelens_core::request::AnalysisRequest;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const SITE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <title>Example Bakery - Fresh bread daily</title>
  <meta name="description" content="Family bakery baking sourdough, pastries and cakes every morning since 1987.">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <link rel="canonical" href="https://example.com/">
  <script src="https://www.googletagmanager.com/gtag/js?id=G-1"></script>
</head>
<body>
  <header><nav><a href="/menu">Menu</a></nav></header>
  <h1>Example Bakery</h1>
  <img src="/bread.jpg" alt="Sourdough loaf">
  <footer>Open daily</footer>
</body>
</html>"#;

fn orchestrator(config: &AnalyzerConfig) -> Orchestrator {
    default_analyzers(config)
        .unwrap()
        .into_iter()
        .fold(Orchestrator::new(), |orchestrator, analyzer| {
            orchestrator.with_analyzer(analyzer)
        })
}

#[tokio::test]
async fn test_full_profile_against_mock_site() {
    let site = MockServer::start().await;
    let pagespeed = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .insert_header("server", "nginx")
                .insert_header("strict-transport-security", "max-age=31536000")
                .insert_header("content-security-policy", "default-src 'self'")
                .insert_header("x-frame-options", "DENY")
                .insert_header("x-content-type-options", "nosniff")
                .set_body_bytes(SITE.as_bytes()),
        )
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/runPagespeed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lighthouseResult": {
                "categories": {"performance": {"score": 0.9}},
                "audits": {"interactive": {"numericValue": 1500.0}}
            }
        })))
        .mount(&pagespeed)
        .await;

    let config = AnalyzerConfig {
        pagespeed_endpoint: Some(format!("{}/runPagespeed", pagespeed.uri())),
        ..AnalyzerConfig::default()
    };
    let request = AnalysisRequest::parse(&site.uri(), "full").unwrap();

    let report = orchestrator(&config).run(&request).await;

    assert_eq!(report.score(Dimension::Seo), Some(100));
    assert_eq!(report.score(Dimension::Performance), Some(90));
    // no https on the mock server: 0 + 40 headers + 20 without a scan
    assert_eq!(report.score(Dimension::Security), Some(60));
    assert_eq!(report.score(Dimension::Ux), Some(100));
    assert_eq!(report.score(Dimension::Ai), Some(0));
    assert_eq!(report.overall_score, 70);
    assert_eq!(report.degraded_dimensions(), vec![Dimension::Ai]);

    let technology = &report.dimensions[&Dimension::Technology];
    let names: Vec<&str> = technology.raw.as_ref().unwrap()["technologies"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert_eq!(names, vec!["nginx", "Google Analytics"]);

    assert!(report.strengths.contains(&"Fast page load time (1.5s)".to_string()));
    assert!(report.weaknesses.contains(&"Site is not served over HTTPS".to_string()));
}

#[tokio::test]
async fn test_broken_site_degrades_gracefully() {
    let site = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).insert_header("content-type", "text/html"))
        .mount(&site)
        .await;

    let request = AnalysisRequest::parse(&site.uri(), "seo").unwrap();
    let report = orchestrator(&AnalyzerConfig::default()).run(&request).await;

    let seo = &report.dimensions[&Dimension::Seo];
    assert_eq!(seo.score, Some(50));
    assert!(seo.error.as_deref().unwrap().starts_with("unavailable"));

    // the security pass still reads the error page: no https, no headers
    assert_eq!(report.score(Dimension::Security), Some(20));
    assert!(report.weaknesses.contains(&"Server Error - 500".to_string()));
    assert_eq!(report.overall_score, 35);
}
