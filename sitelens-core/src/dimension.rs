use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Scoring axis. Declaration order is the canonical report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Seo,
    Performance,
    Security,
    Ux,
    Technology,
    Ai,
    #[serde(rename = "maps_presence")]
    Business,
}

impl Dimension {
    pub const CANONICAL_ORDER: [Dimension; 7] = [
        Dimension::Seo,
        Dimension::Performance,
        Dimension::Security,
        Dimension::Ux,
        Dimension::Technology,
        Dimension::Ai,
        Dimension::Business,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Seo => "seo",
            Dimension::Performance => "performance",
            Dimension::Security => "security",
            Dimension::Ux => "ux",
            Dimension::Technology => "technology",
            Dimension::Ai => "ai",
            Dimension::Business => "maps_presence",
        }
    }

    /// Human readable name used in synthesized findings
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Seo => "SEO",
            Dimension::Performance => "performance",
            Dimension::Security => "security",
            Dimension::Ux => "user experience",
            Dimension::Technology => "technology",
            Dimension::Ai => "AI insight",
            Dimension::Business => "maps presence",
        }
    }

    /// Technology detection is informational only
    pub fn is_scored(&self) -> bool {
        !matches!(self, Dimension::Technology)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Findings {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

impl Findings {
    pub fn is_empty(&self) -> bool {
        self.strengths.is_empty() && self.weaknesses.is_empty() && self.recommendations.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStructure {
    pub navigation: bool,
    pub header: bool,
    pub footer: bool,
}

impl PageStructure {
    pub fn is_complete(&self) -> bool {
        self.navigation && self.header && self.footer
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageStats {
    pub total: u32,
    pub with_alt: u32,
}

impl ImageStats {
    pub fn all_described(&self) -> bool {
        self.total > 0 && self.with_alt >= self.total
    }
}

/// Typed inputs for the user-experience composite
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_time_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ux_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<PageStructure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<ImageStats>,
}

/// One dimension after normalization (and later, fallback)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDimension {
    pub score: Option<u8>,
    pub findings: Findings,
    pub raw: Option<Value>,
    #[serde(default, skip_serializing_if = "is_default_signals")]
    pub signals: Signals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

fn is_default_signals(signals: &Signals) -> bool {
    *signals == Signals::default()
}

impl NormalizedDimension {
    /// Dimension with no analyzer result at all
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_score(score: u8) -> Self {
        Self {
            score: Some(clamp_score(score as f64)),
            ..Self::default()
        }
    }

    /// Score came from analyzer data rather than the fallback policy
    pub fn is_measured(&self) -> bool {
        self.score.is_some() && self.fallback_reason.is_none()
    }
}

/// Round and clamp a raw score into 0..=100
pub fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
