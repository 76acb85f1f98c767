//! Result normalizer.
//!
//! Every analyzer reports its score under its own key and in its own shape.
//! This module holds that mapping and turns each [`AnalyzerOutcome`] into a
//! [`NormalizedDimension`]. It never fails: anything missing or malformed is
//! treated as absent.

use crate::analyzer::{AnalyzerKind, AnalyzerOutcome, Payload};
use crate::dimension::{
    Dimension, Findings, ImageStats, NormalizedDimension, PageStructure, Signals, clamp_score,
};
use crate::fallback::fallback_score;
use crate::scoring::{
    BusinessInputs, SECURITY_HEADERS, SecurityInputs, UxInputs, business_composite,
    security_composite, ux_composite,
};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Keys holding an analyzer's own score, in lookup order
fn score_keys(kind: AnalyzerKind) -> &'static [&'static str] {
    match kind {
        AnalyzerKind::Seo => &["seo_score", "score"],
        AnalyzerKind::Performance => &["performance_score", "score"],
        AnalyzerKind::Security => &["security_score"],
        AnalyzerKind::Technology => &[],
        AnalyzerKind::BusinessListing => &["business_score"],
        AnalyzerKind::AiInsight => &["ai_score", "score"],
    }
}

pub fn normalize(outcome: &AnalyzerOutcome, kind: AnalyzerKind) -> NormalizedDimension {
    match outcome {
        AnalyzerOutcome::Success { payload } => normalize_payload(payload, kind),
        AnalyzerOutcome::Failure {
            kind: failure,
            message,
        } => NormalizedDimension {
            error: Some(format!("{}: {}", failure.as_str(), message)),
            ..NormalizedDimension::empty()
        },
    }
}

fn normalize_payload(payload: &Payload, kind: AnalyzerKind) -> NormalizedDimension {
    let score = score_keys(kind)
        .iter()
        .find_map(|key| payload.get(*key).and_then(read_score))
        .or_else(|| match kind {
            AnalyzerKind::Security => security_inputs(payload).map(|i| security_composite(&i)),
            AnalyzerKind::BusinessListing => {
                business_inputs(payload).map(|i| business_composite(&i))
            }
            _ => None,
        });

    if score.is_none() && kind.dimension().is_scored() {
        debug!("{} payload carried no usable score", kind);
    }

    NormalizedDimension {
        score,
        findings: read_findings(payload),
        raw: Some(Value::Object(payload.clone())),
        signals: read_signals(payload, kind),
        error: None,
        fallback_reason: None,
    }
}

fn read_score(value: &Value) -> Option<u8> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .map(clamp_score)
}

fn read_strings(payload: &Payload, key: &str) -> Vec<String> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn read_findings(payload: &Payload) -> Findings {
    Findings {
        strengths: read_strings(payload, "strengths"),
        weaknesses: read_strings(payload, "weaknesses"),
        recommendations: read_strings(payload, "recommendations"),
    }
}

/// Truthy for `true`, non-empty strings/arrays/objects and non-zero numbers
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
    }
}

fn read_bool(payload: &Payload, key: &str) -> bool {
    payload.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn read_signals(payload: &Payload, kind: AnalyzerKind) -> Signals {
    match kind {
        AnalyzerKind::Performance => Signals {
            load_time_secs: payload
                .get("load_time")
                .and_then(Value::as_f64)
                .filter(|v| v.is_finite() && *v >= 0.0),
            ux_score: payload.get("ux_score").and_then(read_score),
            ..Signals::default()
        },
        AnalyzerKind::Seo => Signals {
            structure: payload
                .get("structure")
                .and_then(Value::as_object)
                .map(|structure| PageStructure {
                    navigation: read_bool(structure, "navigation"),
                    header: read_bool(structure, "header"),
                    footer: read_bool(structure, "footer"),
                }),
            images: payload
                .get("images")
                .and_then(Value::as_object)
                .map(|images| ImageStats {
                    total: read_count(images.get("total")),
                    with_alt: read_count(images.get("with_alt")),
                }),
            ..Signals::default()
        },
        _ => Signals::default(),
    }
}

fn read_count(value: Option<&Value>) -> u32 {
    value
        .and_then(Value::as_u64)
        .map(|n| n.min(u64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

fn security_inputs(payload: &Payload) -> Option<SecurityInputs> {
    if !payload.contains_key("ssl") && !payload.contains_key("headers") {
        return None;
    }

    let ssl = match payload.get("ssl") {
        Some(Value::Object(ssl)) => read_bool(ssl, "enabled") || read_bool(ssl, "valid"),
        other => is_present(other),
    };

    let headers_present = payload
        .get("headers")
        .and_then(Value::as_object)
        .map(|headers| {
            SECURITY_HEADERS
                .iter()
                .filter(|name| {
                    headers
                        .iter()
                        .any(|(key, value)| key.eq_ignore_ascii_case(name) && is_present(Some(value)))
                })
                .count()
        })
        .unwrap_or(0);

    let critical_issues = payload
        .get("vulnerability_scan")
        .and_then(Value::as_object)
        .map(|scan| read_count(scan.get("critical_issues")));

    Some(SecurityInputs {
        ssl,
        headers_present,
        critical_issues,
    })
}

fn business_inputs(payload: &Payload) -> Option<BusinessInputs> {
    if !payload.contains_key("rating") && !payload.contains_key("business_status") {
        return None;
    }

    Some(BusinessInputs {
        rating: payload.get("rating").and_then(Value::as_f64),
        review_count: read_count(payload.get("user_ratings_total")),
        has_website: is_present(payload.get("website")),
        has_phone: is_present(payload.get("formatted_phone_number"))
            || is_present(payload.get("phone")),
        has_hours: is_present(payload.get("opening_hours")),
        operational: payload
            .get("business_status")
            .and_then(Value::as_str)
            .is_some_and(|status| status.eq_ignore_ascii_case("operational")),
    })
}

/// Build the user-experience dimension from the SEO and performance results.
///
/// An explicit `ux_score` from the performance analyzer wins. Otherwise the
/// UX composite is computed when a load time is known, using post-fallback
/// SEO and performance scores. With neither, the score stays absent.
pub fn derive_ux(dimensions: &BTreeMap<Dimension, NormalizedDimension>) -> NormalizedDimension {
    let seo = dimensions.get(&Dimension::Seo);
    let performance = dimensions.get(&Dimension::Performance);

    let effective = |dimension: Dimension, normalized: Option<&NormalizedDimension>| {
        normalized
            .and_then(|n| n.score)
            .or_else(|| fallback_score(dimension))
            .unwrap_or(0)
    };

    let signals = Signals {
        load_time_secs: performance.and_then(|p| p.signals.load_time_secs),
        ux_score: performance.and_then(|p| p.signals.ux_score),
        structure: seo.and_then(|s| s.signals.structure),
        images: seo.and_then(|s| s.signals.images),
    };

    let score = signals.ux_score.or_else(|| {
        signals.load_time_secs.map(|load_time_secs| {
            ux_composite(&UxInputs {
                load_time_secs,
                seo_score: effective(Dimension::Seo, seo),
                performance_score: effective(Dimension::Performance, performance),
                structure: signals.structure.unwrap_or_default(),
                images: signals.images.unwrap_or_default(),
            })
        })
    });

    NormalizedDimension {
        score,
        signals,
        ..NormalizedDimension::empty()
    }
}
