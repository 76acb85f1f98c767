//! Business listing adapter over the Places web service.
//!
//! Looks the business up with a text search, then fetches the listing
//! details. In competitor mode the remaining search results are returned as
//! `competitors` and compared against the listing.

use crate::error::{Result, ScanError};
use crate::payload::into_payload;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sitelens_core::analyzer::{
    Analyzer, AnalyzerError, AnalyzerKind, AnalyzerOptions, COMPETITORS_MODE, MODE_OPTION, Payload,
};
use sitelens_core::request::{BusinessDescriptor, TargetDescriptor};
use tracing::{debug, info, warn};

pub const DEFAULT_PLACES_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/place";

const DETAIL_FIELDS: &str = "name,rating,user_ratings_total,website,formatted_phone_number,opening_hours,business_status,formatted_address";
const MAX_COMPETITORS: usize = 5;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceSummary>,
    error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaceSummary {
    pub place_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<serde_json::Map<String, Value>>,
    error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoListing {
    pub found: bool,
    pub query: String,
    pub business_score: u8,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

fn check_status(status: &str, error_message: Option<String>) -> Result<()> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(ScanError::ApiError(match error_message {
            Some(message) => format!("{}: {}", other, message),
            None => other.to_string(),
        })),
    }
}

fn listing_findings(listing: &Payload) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut recommendations = Vec::new();

    match listing.get("rating").and_then(Value::as_f64) {
        Some(rating) if rating >= 4.5 => strengths.push(format!("Excellent customer rating ({:.1})", rating)),
        Some(rating) if rating < 3.5 => {
            weaknesses.push(format!("Low customer rating ({:.1})", rating));
            recommendations.push("Respond to negative reviews and address recurring complaints".to_string());
        }
        Some(_) => {}
        None => weaknesses.push("Listing has no customer rating yet".to_string()),
    }

    let reviews = listing
        .get("user_ratings_total")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    if reviews < 10 {
        weaknesses.push(format!("Only {} customer reviews", reviews));
        recommendations.push("Ask satisfied customers to leave a review".to_string());
    } else if reviews >= 100 {
        strengths.push(format!("{} customer reviews", reviews));
    }

    for (key, missing, advice) in [
        ("website", "Listing has no website", "Link the business website from the listing"),
        ("formatted_phone_number", "Listing has no phone number", "Add a phone number to the listing"),
        ("opening_hours", "Listing has no opening hours", "Publish opening hours on the listing"),
    ] {
        if listing.get(key).is_none_or(Value::is_null) {
            weaknesses.push(missing.to_string());
            recommendations.push(advice.to_string());
        }
    }

    (strengths, weaknesses, recommendations)
}

fn competitor_findings(listing: &Payload, competitors: &[PlaceSummary]) -> (Vec<String>, Vec<String>) {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    let rated: Vec<f64> = competitors.iter().filter_map(|c| c.rating).collect();
    if let Some(own) = listing.get("rating").and_then(Value::as_f64)
        && !rated.is_empty()
    {
        let average = rated.iter().sum::<f64>() / rated.len() as f64;
        if own >= average {
            strengths.push(format!(
                "Rated at or above nearby competitors ({:.1} vs {:.1} average)",
                own, average
            ));
        } else {
            weaknesses.push(format!(
                "Rated below nearby competitors ({:.1} vs {:.1} average)",
                own, average
            ));
        }
    }

    (strengths, weaknesses)
}

pub struct PlacesAnalyzer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl PlacesAnalyzer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoint: DEFAULT_PLACES_ENDPOINT.to_string(),
            api_key: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{}", self.endpoint, path);
        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::StatusError {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn analyze(&self, business: &BusinessDescriptor, competitors_mode: bool) -> Result<Payload> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ScanError::MissingCredential("Places API key"))?;
        let query = business.search_query();

        debug!("Searching listings for '{}'", query);
        let search: SearchResponse = self
            .get_json("textsearch/json", &[("query", query.as_str()), ("key", key)])
            .await?;
        check_status(&search.status, search.error_message)?;

        let mut results = search.results.into_iter();
        let Some(best) = results.next() else {
            warn!("No listing found for '{}'", query);
            return into_payload(&NoListing {
                found: false,
                query: query.clone(),
                business_score: 0,
                weaknesses: vec![format!("No maps listing found for {}", business.name)],
                recommendations: vec!["Create and verify a business profile on Google Maps".to_string()],
            });
        };

        let details: DetailsResponse = self
            .get_json(
                "details/json",
                &[
                    ("place_id", best.place_id.as_str()),
                    ("fields", DETAIL_FIELDS),
                    ("key", key),
                ],
            )
            .await?;
        check_status(&details.status, details.error_message)?;
        let mut listing = details
            .result
            .ok_or_else(|| ScanError::ParseError("details response has no result".to_string()))?;

        let (mut strengths, mut weaknesses, recommendations) = listing_findings(&listing);

        if competitors_mode {
            let competitors: Vec<PlaceSummary> = results.take(MAX_COMPETITORS).collect();
            let (more_strengths, more_weaknesses) = competitor_findings(&listing, &competitors);
            strengths.extend(more_strengths);
            weaknesses.extend(more_weaknesses);
            listing.insert("competitors".to_string(), serde_json::to_value(&competitors)?);
        }

        info!(
            "Listing for '{}': {} ({} strengths, {} weaknesses)",
            query,
            best.name,
            strengths.len(),
            weaknesses.len()
        );

        listing.insert("found".to_string(), Value::Bool(true));
        listing.insert("place_id".to_string(), Value::String(best.place_id));
        listing.insert("strengths".to_string(), serde_json::to_value(strengths)?);
        listing.insert("weaknesses".to_string(), serde_json::to_value(weaknesses)?);
        listing.insert("recommendations".to_string(), serde_json::to_value(recommendations)?);
        Ok(listing)
    }
}

#[async_trait]
impl Analyzer for PlacesAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::BusinessListing
    }

    async fn invoke(
        &self,
        target: &TargetDescriptor,
        options: &AnalyzerOptions,
    ) -> std::result::Result<Payload, AnalyzerError> {
        let business = target.business().ok_or_else(|| {
            ScanError::UnsupportedTarget(format!("{} is not a business listing", target))
        })?;
        let competitors_mode = options
            .get(MODE_OPTION)
            .and_then(Value::as_str)
            .is_some_and(|mode| mode == COMPETITORS_MODE);

        Ok(self.analyze(business, competitors_mode).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::default_client;
    use serde_json::json;
    use sitelens_core::analyzer::FailureKind;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    fn business() -> TargetDescriptor {
        TargetDescriptor::Business(
            BusinessDescriptor::new("Example Bakery", Some("bakery"), Some("Portland")).unwrap(),
        )
    }

    async fn mount_search(mock_server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/textsearch/json"))
            .and(query_param("query", "Example Bakery bakery Portland"))
            .and(query_param("key", "places-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(mock_server)
            .await;
    }

    async fn mount_details(mock_server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/details/json"))
            .and(query_param("place_id", "place-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "result": {
                    "name": "Example Bakery",
                    "rating": 4.7,
                    "user_ratings_total": 212,
                    "website": "https://example.com",
                    "formatted_phone_number": "(503) 555-0100",
                    "opening_hours": {"open_now": true},
                    "business_status": "OPERATIONAL"
                }
            })))
            .mount(mock_server)
            .await;
    }

    fn search_results() -> serde_json::Value {
        json!({
            "status": "OK",
            "results": [
                {"place_id": "place-1", "name": "Example Bakery", "rating": 4.7, "user_ratings_total": 212},
                {"place_id": "place-2", "name": "Rival Breads", "rating": 4.1, "user_ratings_total": 80},
                {"place_id": "place-3", "name": "Corner Cakes", "rating": 4.3, "user_ratings_total": 35}
            ]
        })
    }

    fn analyzer(mock_server: &MockServer) -> PlacesAnalyzer {
        PlacesAnalyzer::new(default_client().unwrap())
            .with_endpoint(&format!("{}/", mock_server.uri()))
            .with_api_key(Some("places-key".to_string()))
    }

    #[tokio::test]
    async fn test_listing_details() {
        let mock_server = MockServer::start().await;
        mount_search(&mock_server, search_results()).await;
        mount_details(&mock_server).await;

        let payload = analyzer(&mock_server)
            .invoke(&business(), &AnalyzerOptions::new())
            .await
            .unwrap();

        assert_eq!(payload["rating"], 4.7);
        assert_eq!(payload["user_ratings_total"], 212);
        assert_eq!(payload["found"], true);
        assert!(payload.get("competitors").is_none());
        assert!(payload["weaknesses"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_competitor_mode() {
        let mock_server = MockServer::start().await;
        mount_search(&mock_server, search_results()).await;
        mount_details(&mock_server).await;

        let mut options = AnalyzerOptions::new();
        options.insert(MODE_OPTION.to_string(), json!(COMPETITORS_MODE));

        let payload = analyzer(&mock_server).invoke(&business(), &options).await.unwrap();

        let competitors = payload["competitors"].as_array().unwrap();
        assert_eq!(competitors.len(), 2);
        assert_eq!(competitors[0]["name"], "Rival Breads");
        let strengths = payload["strengths"].as_array().unwrap();
        assert!(strengths.contains(&json!("Rated at or above nearby competitors (4.7 vs 4.2 average)")));
    }

    #[tokio::test]
    async fn test_no_results_scores_zero() {
        let mock_server = MockServer::start().await;
        mount_search(&mock_server, json!({"status": "ZERO_RESULTS", "results": []})).await;

        let payload = analyzer(&mock_server)
            .invoke(&business(), &AnalyzerOptions::new())
            .await
            .unwrap();

        assert_eq!(payload["found"], false);
        assert_eq!(payload["business_score"], 0);
    }

    #[tokio::test]
    async fn test_denied_request_is_unavailable() {
        let mock_server = MockServer::start().await;
        mount_search(
            &mock_server,
            json!({"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}),
        )
        .await;

        let err = analyzer(&mock_server)
            .invoke(&business(), &AnalyzerOptions::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Unavailable);
        assert!(err.to_string().contains("REQUEST_DENIED"));
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let analyzer = PlacesAnalyzer::new(default_client().unwrap()).with_api_key(None);
        let err = analyzer
            .invoke(&business(), &AnalyzerOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotConfigured);
    }

    #[tokio::test]
    async fn test_url_target_is_unsupported() {
        let analyzer = PlacesAnalyzer::new(default_client().unwrap())
            .with_api_key(Some("places-key".to_string()));
        let target = TargetDescriptor::parse_url("example.com").unwrap();
        let err = analyzer
            .invoke(&target, &AnalyzerOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::UnsupportedTarget);
    }

    #[test]
    fn test_listing_findings_for_sparse_listing() {
        let listing = json!({"name": "New Shop", "user_ratings_total": 3});
        let Value::Object(listing) = listing else { unreachable!() };
        let (strengths, weaknesses, recommendations) = listing_findings(&listing);

        assert!(strengths.is_empty());
        assert!(weaknesses.contains(&"Listing has no customer rating yet".to_string()));
        assert!(weaknesses.contains(&"Only 3 customer reviews".to_string()));
        assert!(weaknesses.contains(&"Listing has no website".to_string()));
        assert_eq!(recommendations.len(), 4);
    }
}
