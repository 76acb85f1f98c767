//! Analyzer port.
//!
//! Every analysis source (SEO inspection, PageSpeed, header scan, stack
//! fingerprinting, map listing, language-model insight) implements
//! [`Analyzer`]. The orchestrator only ever sees the trait, so adapters can be
//! swapped or faked freely.

use crate::dimension::Dimension;
use crate::request::TargetDescriptor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Structured analyzer output
pub type Payload = Map<String, Value>;

/// Per-invocation options (mode switches, phase-1 context for the AI pass)
pub type AnalyzerOptions = Map<String, Value>;

/// Option key carrying the phase-1 normalized dimensions into phase 2
pub const CONTEXT_OPTION: &str = "context";

/// Option key selecting the listing lookup mode
pub const MODE_OPTION: &str = "mode";

/// Option value for competitor lookups
pub const COMPETITORS_MODE: &str = "competitors";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    Seo,
    Performance,
    Security,
    Technology,
    BusinessListing,
    AiInsight,
}

/// Scheduling phase. Phase 2 analyzers consume phase 1 output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Independent,
    Dependent,
}

impl AnalyzerKind {
    pub const ALL: [AnalyzerKind; 6] = [
        AnalyzerKind::Seo,
        AnalyzerKind::Performance,
        AnalyzerKind::Security,
        AnalyzerKind::Technology,
        AnalyzerKind::BusinessListing,
        AnalyzerKind::AiInsight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerKind::Seo => "seo",
            AnalyzerKind::Performance => "performance",
            AnalyzerKind::Security => "security",
            AnalyzerKind::Technology => "technology",
            AnalyzerKind::BusinessListing => "business_listing",
            AnalyzerKind::AiInsight => "ai_insight",
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            AnalyzerKind::Seo => Dimension::Seo,
            AnalyzerKind::Performance => Dimension::Performance,
            AnalyzerKind::Security => Dimension::Security,
            AnalyzerKind::Technology => Dimension::Technology,
            AnalyzerKind::BusinessListing => Dimension::Business,
            AnalyzerKind::AiInsight => Dimension::Ai,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            AnalyzerKind::AiInsight => Phase::Dependent,
            _ => Phase::Independent,
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Unavailable,
    Timeout,
    MalformedResponse,
    UnsupportedTarget,
    NotConfigured,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Unavailable => "unavailable",
            FailureKind::Timeout => "timeout",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::UnsupportedTarget => "unsupported_target",
            FailureKind::NotConfigured => "not_configured",
        }
    }
}

/// Exactly one per invoked analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalyzerOutcome {
    Success { payload: Payload },
    Failure { kind: FailureKind, message: String },
}

impl AnalyzerOutcome {
    pub fn success(payload: Payload) -> Self {
        AnalyzerOutcome::Success { payload }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        AnalyzerOutcome::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalyzerOutcome::Success { .. })
    }
}

impl From<AnalyzerError> for AnalyzerOutcome {
    fn from(error: AnalyzerError) -> Self {
        AnalyzerOutcome::failure(error.kind(), error.to_string())
    }
}

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("analyzer unavailable: {0}")]
    Unavailable(String),

    #[error("analyzer timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed analyzer response: {0}")]
    MalformedResponse(String),

    #[error("unsupported target: {0}")]
    UnsupportedTarget(String),

    #[error("analyzer not configured: {0}")]
    NotConfigured(String),
}

impl AnalyzerError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AnalyzerError::Unavailable(_) => FailureKind::Unavailable,
            AnalyzerError::Timeout(_) => FailureKind::Timeout,
            AnalyzerError::MalformedResponse(_) => FailureKind::MalformedResponse,
            AnalyzerError::UnsupportedTarget(_) => FailureKind::UnsupportedTarget,
            AnalyzerError::NotConfigured(_) => FailureKind::NotConfigured,
        }
    }
}

/// Capability every analysis source provides
#[async_trait]
pub trait Analyzer: Send + Sync {
    fn kind(&self) -> AnalyzerKind;

    async fn invoke(
        &self,
        target: &TargetDescriptor,
        options: &AnalyzerOptions,
    ) -> Result<Payload, AnalyzerError>;
}
