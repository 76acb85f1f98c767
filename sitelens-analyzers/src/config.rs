use crate::client::{DEFAULT_TIMEOUT_SECS, http_client};
use crate::error::Result;
use crate::insight::InsightAnalyzer;
use crate::performance::PerformanceAnalyzer;
use crate::places::PlacesAnalyzer;
use crate::security::SecurityAnalyzer;
use crate::seo::SeoAnalyzer;
use crate::technology::TechnologyAnalyzer;
use sitelens_core::analyzer::Analyzer;
use std::sync::Arc;
use tracing::debug;

/// Credentials and endpoints for the analyzers that call external APIs.
/// Missing keys are not an error here: those analyzers report
/// `not_configured` when invoked.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub http_timeout_secs: u64,
    pub pagespeed_key: Option<String>,
    pub pagespeed_endpoint: Option<String>,
    pub places_key: Option<String>,
    pub places_endpoint: Option<String>,
    pub ai_key: Option<String>,
    pub ai_endpoint: Option<String>,
    pub ai_model: Option<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: DEFAULT_TIMEOUT_SECS,
            pagespeed_key: None,
            pagespeed_endpoint: None,
            places_key: None,
            places_endpoint: None,
            ai_key: None,
            ai_endpoint: None,
            ai_model: None,
        }
    }
}

/// One instance of every analyzer, sharing a single HTTP client
pub fn default_analyzers(config: &AnalyzerConfig) -> Result<Vec<Arc<dyn Analyzer>>> {
    let client = http_client(config.http_timeout_secs)?;

    let mut performance =
        PerformanceAnalyzer::new(client.clone()).with_api_key(config.pagespeed_key.clone());
    if let Some(ref endpoint) = config.pagespeed_endpoint {
        performance = performance.with_endpoint(endpoint);
    }

    let mut places = PlacesAnalyzer::new(client.clone()).with_api_key(config.places_key.clone());
    if let Some(ref endpoint) = config.places_endpoint {
        places = places.with_endpoint(endpoint);
    }

    let mut insight = InsightAnalyzer::new(client.clone()).with_api_key(config.ai_key.clone());
    if let Some(ref endpoint) = config.ai_endpoint {
        insight = insight.with_endpoint(endpoint);
    }
    if let Some(ref model) = config.ai_model {
        insight = insight.with_model(model);
    }

    debug!(
        "Analyzer keys: pagespeed={}, places={}, ai={}",
        config.pagespeed_key.is_some(),
        config.places_key.is_some(),
        config.ai_key.is_some()
    );

    Ok(vec![
        Arc::new(SeoAnalyzer::new(client.clone())),
        Arc::new(performance),
        Arc::new(SecurityAnalyzer::new(client.clone())),
        Arc::new(TechnologyAnalyzer::new(client)),
        Arc::new(places),
        Arc::new(insight),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitelens_core::analyzer::AnalyzerKind;

    #[test]
    fn test_every_kind_is_built() {
        let analyzers = default_analyzers(&AnalyzerConfig::default()).unwrap();
        let mut kinds: Vec<AnalyzerKind> = analyzers.iter().map(|a| a.kind()).collect();
        kinds.sort();
        assert_eq!(kinds, AnalyzerKind::ALL.to_vec());
    }
}
