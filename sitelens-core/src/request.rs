use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Requested scope of an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    Full,
    Seo,
    Performance,
    Competitors,
    Business,
}

impl Profile {
    pub const ALL: [Profile; 5] = [
        Profile::Full,
        Profile::Seo,
        Profile::Performance,
        Profile::Competitors,
        Profile::Business,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Full => "full",
            Profile::Seo => "seo",
            Profile::Performance => "performance",
            Profile::Competitors => "competitors",
            Profile::Business => "business",
        }
    }
}

impl FromStr for Profile {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(Profile::Full),
            "seo" => Ok(Profile::Seo),
            "performance" => Ok(Profile::Performance),
            "competitors" => Ok(Profile::Competitors),
            "business" => Ok(Profile::Business),
            _ => Err(EngineError::UnknownProfile(s.to_string())),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A business as a map listing would know it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl BusinessDescriptor {
    pub fn new(
        name: &str,
        category: Option<&str>,
        region: Option<&str>,
    ) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidBusiness(
                "business name must not be empty".to_string(),
            ));
        }

        Ok(Self {
            name: name.to_string(),
            category: non_empty(category),
            region: non_empty(region),
        })
    }

    /// Free-text query used by listing lookups, e.g. "Blue Bottle cafe Oakland"
    pub fn search_query(&self) -> String {
        [Some(self.name.as_str()), self.category.as_deref(), self.region.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// What an analyzer is pointed at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetDescriptor {
    Url { url: Url },
    Business(BusinessDescriptor),
}

impl TargetDescriptor {
    /// Parse a website target. Bare hosts get an https scheme.
    pub fn parse_url(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(EngineError::InvalidUrl("empty target".to_string()));
        }

        let candidate = if input.contains("://") {
            input.to_string()
        } else {
            format!("https://{}", input)
        };
        let parsed = Url::parse(&candidate)
            .map_err(|e| EngineError::InvalidUrl(format!("{}: {}", input, e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(EngineError::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                input,
                parsed.scheme()
            )));
        }
        if parsed.host_str().is_none() {
            return Err(EngineError::InvalidUrl(format!("{}: missing host", input)));
        }

        Ok(TargetDescriptor::Url { url: parsed })
    }

    pub fn url(&self) -> Option<&Url> {
        match self {
            TargetDescriptor::Url { url } => Some(url),
            TargetDescriptor::Business(_) => None,
        }
    }

    pub fn business(&self) -> Option<&BusinessDescriptor> {
        match self {
            TargetDescriptor::Url { .. } => None,
            TargetDescriptor::Business(business) => Some(business),
        }
    }
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetDescriptor::Url { url } => f.write_str(url.as_str()),
            TargetDescriptor::Business(business) => f.write_str(&business.search_query()),
        }
    }
}

/// One analysis request. Validated on construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRequest")]
pub struct AnalysisRequest {
    target: TargetDescriptor,
    profile: Profile,
    business_name: Option<String>,
}

/// Stored request shape, re-validated through the constructors on load
#[derive(Deserialize)]
struct RawRequest {
    target: TargetDescriptor,
    profile: Profile,
    business_name: Option<String>,
}

impl TryFrom<RawRequest> for AnalysisRequest {
    type Error = EngineError;

    fn try_from(raw: RawRequest) -> Result<Self> {
        let target = match raw.target {
            TargetDescriptor::Url { url } => TargetDescriptor::parse_url(url.as_str())?,
            TargetDescriptor::Business(business) => TargetDescriptor::Business(BusinessDescriptor::new(
                &business.name,
                business.category.as_deref(),
                business.region.as_deref(),
            )?),
        };

        let request = Self::new(target, raw.profile);
        match raw.business_name {
            Some(name) => request.with_business_name(&name),
            None => Ok(request),
        }
    }
}

impl AnalysisRequest {
    pub fn new(target: TargetDescriptor, profile: Profile) -> Self {
        Self {
            target,
            profile,
            business_name: None,
        }
    }

    /// Build a request from raw user input
    pub fn parse(target: &str, profile: &str) -> Result<Self> {
        let profile = profile.parse::<Profile>()?;
        let target = TargetDescriptor::parse_url(target)?;
        Ok(Self::new(target, profile))
    }

    /// Attach a business name so URL analyses can also look up the listing
    pub fn with_business_name(mut self, name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidBusiness(
                "business name must not be empty".to_string(),
            ));
        }
        self.business_name = Some(name.to_string());
        Ok(self)
    }

    pub fn target(&self) -> &TargetDescriptor {
        &self.target
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn business_name(&self) -> Option<&str> {
        self.business_name.as_deref()
    }

    /// Listing target: an explicit business target wins over the attached name
    pub fn business_target(&self) -> Option<BusinessDescriptor> {
        if let Some(business) = self.target.business() {
            return Some(business.clone());
        }

        self.business_name.as_ref().map(|name| BusinessDescriptor {
            name: name.clone(),
            category: None,
            region: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_str_case_insensitive() {
        assert_eq!("FULL".parse::<Profile>().unwrap(), Profile::Full);
        assert_eq!(" seo ".parse::<Profile>().unwrap(), Profile::Seo);
        assert_eq!("Competitors".parse::<Profile>().unwrap(), Profile::Competitors);
    }

    #[test]
    fn test_profile_unknown_is_rejected() {
        let err = "everything".parse::<Profile>().unwrap_err();
        assert!(matches!(err, EngineError::UnknownProfile(ref p) if p == "everything"));
    }

    #[test]
    fn test_profile_round_trips_through_as_str() {
        for profile in Profile::ALL {
            assert_eq!(profile.as_str().parse::<Profile>().unwrap(), profile);
        }
    }

    #[test]
    fn test_parse_url_adds_https_scheme() {
        let target = TargetDescriptor::parse_url("example.com").unwrap();
        assert_eq!(target.url().unwrap().as_str(), "https://example.com/");
    }

    #[test]
    fn test_parse_url_keeps_http_scheme() {
        let target = TargetDescriptor::parse_url("http://example.com/shop").unwrap();
        assert_eq!(target.url().unwrap().scheme(), "http");
    }

    #[test]
    fn test_parse_url_rejects_other_schemes() {
        assert!(TargetDescriptor::parse_url("ftp://example.com").is_err());
        assert!(TargetDescriptor::parse_url("").is_err());
    }

    #[test]
    fn test_business_descriptor_requires_name() {
        assert!(BusinessDescriptor::new("   ", Some("cafe"), None).is_err());
    }

    #[test]
    fn test_business_search_query_skips_empty_parts() {
        let business = BusinessDescriptor::new("Blue Door", Some(""), Some("Oakland")).unwrap();
        assert_eq!(business.category, None);
        assert_eq!(business.search_query(), "Blue Door Oakland");
    }

    #[test]
    fn test_request_business_target_from_name() {
        let request = AnalysisRequest::parse("example.com", "full")
            .unwrap()
            .with_business_name("Example Bakery")
            .unwrap();
        assert_eq!(request.business_target().unwrap().name, "Example Bakery");
    }

    #[test]
    fn test_request_without_business_has_no_listing_target() {
        let request = AnalysisRequest::parse("example.com", "seo").unwrap();
        assert!(request.business_target().is_none());
    }

    #[test]
    fn test_request_deserialization_is_validated() {
        let request = AnalysisRequest::parse("example.com", "full")
            .unwrap()
            .with_business_name("Example Bakery")
            .unwrap();
        let json = serde_json::to_string(&request).unwrap();
        let restored: AnalysisRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, request);

        let empty_name = r#"{"target":{"kind":"url","url":"https://example.com/"},"profile":"full","business_name":""}"#;
        assert!(serde_json::from_str::<AnalysisRequest>(empty_name).is_err());

        let ftp = r#"{"target":{"kind":"url","url":"ftp://example.com/"},"profile":"seo","business_name":null}"#;
        assert!(serde_json::from_str::<AnalysisRequest>(ftp).is_err());

        let blank_business = r#"{"target":{"kind":"business","name":"  "},"profile":"business","business_name":null}"#;
        assert!(serde_json::from_str::<AnalysisRequest>(blank_business).is_err());
    }

    #[test]
    fn test_request_parse_rejects_unknown_profile() {
        assert!(matches!(
            AnalysisRequest::parse("example.com", "deep"),
            Err(EngineError::UnknownProfile(_))
        ));
    }
}
