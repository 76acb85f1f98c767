//! Composite scoring.
//!
//! The overall score is a plain mean of the scored dimensions in the report.
//! Security, user experience and business listings have their own weighted
//! formulas with per-component caps. Every function here is pure.

use crate::dimension::{Dimension, ImageStats, NormalizedDimension, PageStructure, clamp_score};
use std::collections::BTreeMap;

/// Overall score when no scored dimension is present
pub const EMPTY_ANALYSIS_BASELINE: u8 = 70;

/// Security headers counted by the security composite
pub const SECURITY_HEADERS: [&str; 4] = [
    "strict-transport-security",
    "content-security-policy",
    "x-frame-options",
    "x-content-type-options",
];

const SSL_POINTS: f64 = 30.0;
const HEADER_POINTS: f64 = 10.0;
const HEADER_CAP: f64 = 40.0;
const VULNERABILITY_BASELINE: f64 = 30.0;
const VULNERABILITY_PENALTY: f64 = 10.0;
const NO_SCAN_POINTS: f64 = 20.0;

const UX_SEO_WEIGHT: f64 = 0.3;
const UX_PERFORMANCE_WEIGHT: f64 = 0.3;
const UX_STRUCTURE_BONUS: f64 = 5.0;
const UX_ALT_TEXT_BONUS: f64 = 5.0;

/// Mean of the post-fallback scores of every scored dimension present.
/// Unscored dimensions (technology) and dimensions still without a score are
/// skipped.
pub fn overall_score(dimensions: &BTreeMap<Dimension, NormalizedDimension>) -> u8 {
    let scores: Vec<f64> = dimensions
        .iter()
        .filter(|(dimension, _)| dimension.is_scored())
        .filter_map(|(_, normalized)| normalized.score)
        .map(f64::from)
        .collect();

    if scores.is_empty() {
        return EMPTY_ANALYSIS_BASELINE;
    }

    clamp_score(scores.iter().sum::<f64>() / scores.len() as f64)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityInputs {
    pub ssl: bool,
    /// How many of [`SECURITY_HEADERS`] the response carried
    pub headers_present: usize,
    /// Critical issue count from a vulnerability scan, if one ran
    pub critical_issues: Option<u32>,
}

pub fn security_composite(inputs: &SecurityInputs) -> u8 {
    let ssl = if inputs.ssl { SSL_POINTS } else { 0.0 };
    let headers = (inputs.headers_present as f64 * HEADER_POINTS).min(HEADER_CAP);
    let vulnerabilities = match inputs.critical_issues {
        Some(critical) => {
            (VULNERABILITY_BASELINE - VULNERABILITY_PENALTY * f64::from(critical)).max(0.0)
        }
        None => NO_SCAN_POINTS,
    };

    clamp_score(ssl + headers + vulnerabilities)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UxInputs {
    pub load_time_secs: f64,
    pub seo_score: u8,
    pub performance_score: u8,
    pub structure: PageStructure,
    pub images: ImageStats,
}

fn load_time_points(load_time_secs: f64) -> f64 {
    if load_time_secs <= 2.0 {
        40.0
    } else if load_time_secs <= 4.0 {
        30.0
    } else if load_time_secs <= 6.0 {
        20.0
    } else {
        10.0
    }
}

pub fn ux_composite(inputs: &UxInputs) -> u8 {
    let mut score = load_time_points(inputs.load_time_secs)
        + f64::from(inputs.seo_score) * UX_SEO_WEIGHT
        + f64::from(inputs.performance_score) * UX_PERFORMANCE_WEIGHT;

    if inputs.structure.is_complete() {
        score += UX_STRUCTURE_BONUS;
    }
    if inputs.images.all_described() {
        score += UX_ALT_TEXT_BONUS;
    }

    clamp_score(score)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessInputs {
    pub rating: Option<f64>,
    pub review_count: u32,
    pub has_website: bool,
    pub has_phone: bool,
    pub has_hours: bool,
    pub operational: bool,
}

pub fn business_composite(inputs: &BusinessInputs) -> u8 {
    let rating = inputs.rating.unwrap_or(0.0).clamp(0.0, 5.0);
    let mut score = rating / 5.0 * 40.0;
    score += (f64::from(inputs.review_count) / 100.0 * 20.0).min(20.0);

    if inputs.has_website {
        score += 15.0;
    }
    if inputs.has_phone {
        score += 10.0;
    }
    if inputs.has_hours {
        score += 10.0;
    }
    if inputs.operational {
        score += 5.0;
    }

    clamp_score(score)
}
