// Recommendation aggregation: merge per-dimension findings into one narrative

use crate::dimension::{Dimension, Findings, NormalizedDimension};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const MAX_RECOMMENDATIONS: usize = 10;

/// Score thresholds that turn a measured score into a synthesized finding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Scores at or above this are a strength
    pub strong: u8,
    /// Scores below this are a weakness
    pub weak: u8,
}

/// Load time at or under this many seconds is a strength
pub const FAST_LOAD_SECS: f64 = 2.0;
/// Load time over this many seconds is a weakness
pub const SLOW_LOAD_SECS: f64 = 5.0;

pub fn thresholds(dimension: Dimension) -> Option<Thresholds> {
    match dimension {
        Dimension::Seo => Some(Thresholds { strong: 80, weak: 50 }),
        Dimension::Performance => Some(Thresholds { strong: 80, weak: 50 }),
        Dimension::Security => Some(Thresholds { strong: 80, weak: 50 }),
        Dimension::Ux => Some(Thresholds { strong: 80, weak: 50 }),
        Dimension::Ai => Some(Thresholds { strong: 80, weak: 50 }),
        Dimension::Business => Some(Thresholds { strong: 80, weak: 50 }),
        Dimension::Technology => None,
    }
}

fn improvement_advice(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Seo => {
            "Improve on-page SEO: write descriptive titles and meta descriptions and use one clear H1 per page"
        }
        Dimension::Performance => {
            "Improve page performance: compress images, minify scripts and styles, and enable caching"
        }
        Dimension::Security => {
            "Harden site security: serve every page over HTTPS and add the missing security headers"
        }
        Dimension::Ux => {
            "Improve user experience: simplify navigation, describe images and reduce load time"
        }
        Dimension::Technology => "Keep the site's software stack up to date",
        Dimension::Ai => "Review the AI insight findings and address the highest-impact items first",
        Dimension::Business => {
            "Complete the business listing with website, phone and opening hours, and ask customers for reviews"
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Threshold findings for one measured dimension
fn synthesize(dimension: Dimension, normalized: &NormalizedDimension) -> Findings {
    let mut findings = Findings::default();

    if !normalized.is_measured() {
        return findings;
    }

    if let (Some(score), Some(limits)) = (normalized.score, thresholds(dimension)) {
        if score >= limits.strong {
            findings
                .strengths
                .push(format!("Strong {} score ({}/100)", dimension.label(), score));
        } else if score < limits.weak {
            findings
                .weaknesses
                .push(format!("Weak {} score ({}/100)", dimension.label(), score));
            findings
                .recommendations
                .push(improvement_advice(dimension).to_string());
        }
    }

    if dimension == Dimension::Performance
        && let Some(load_time) = normalized.signals.load_time_secs
    {
        if load_time <= FAST_LOAD_SECS {
            findings
                .strengths
                .push(format!("Fast page load time ({:.1}s)", load_time));
        } else if load_time > SLOW_LOAD_SECS {
            findings
                .weaknesses
                .push(format!("Slow page load time ({:.1}s)", load_time));
            findings.recommendations.push(
                "Reduce page load time below 2 seconds by optimizing images and deferring non-critical scripts"
                    .to_string(),
            );
        }
    }

    findings
}

/// Keep the first occurrence of every string, preserving order
pub fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

pub fn aggregate(dimensions: &BTreeMap<Dimension, NormalizedDimension>) -> Narrative {
    let mut narrative = Narrative::default();

    for dimension in Dimension::CANONICAL_ORDER {
        let Some(normalized) = dimensions.get(&dimension) else {
            continue;
        };

        for findings in [normalized.findings.clone(), synthesize(dimension, normalized)] {
            narrative.strengths.extend(findings.strengths);
            narrative.weaknesses.extend(findings.weaknesses);
            narrative.recommendations.extend(findings.recommendations);
        }
    }

    narrative.strengths = dedup_preserving_order(narrative.strengths);
    narrative.weaknesses = dedup_preserving_order(narrative.weaknesses);
    narrative.recommendations = dedup_preserving_order(narrative.recommendations);
    narrative.recommendations.truncate(MAX_RECOMMENDATIONS);

    narrative
}
