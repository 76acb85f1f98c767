//! Default scores for dimensions whose analyzer failed, timed out or never ran.
//!
//! Security and UX default to optimistic-neutral values so an outage does not
//! penalize a site. AI defaults to zero so a missing insight visibly lowers
//! the overall score instead of pretending to be good.

use crate::dimension::{Dimension, NormalizedDimension};
use tracing::debug;

pub const SECURITY_FALLBACK: u8 = 75;
pub const UX_FALLBACK: u8 = 70;
pub const AI_FALLBACK: u8 = 0;
pub const DEFAULT_FALLBACK: u8 = 50;

/// Default score for a dimension, `None` for unscored dimensions
pub fn fallback_score(dimension: Dimension) -> Option<u8> {
    match dimension {
        Dimension::Security => Some(SECURITY_FALLBACK),
        Dimension::Ux => Some(UX_FALLBACK),
        Dimension::Ai => Some(AI_FALLBACK),
        Dimension::Technology => None,
        Dimension::Seo | Dimension::Performance | Dimension::Business => Some(DEFAULT_FALLBACK),
    }
}

/// Fill in a missing score. Identity when the dimension already has one.
pub fn apply_fallback(mut normalized: NormalizedDimension, dimension: Dimension) -> NormalizedDimension {
    if normalized.score.is_some() {
        return normalized;
    }

    let Some(default) = fallback_score(dimension) else {
        return normalized;
    };

    let cause = match normalized.error.as_deref() {
        Some(error) => format!("{} analysis failed ({})", dimension.label(), error),
        None if normalized.raw.is_some() => {
            format!("{} analysis returned no score", dimension.label())
        }
        None => format!("no {} result available", dimension.label()),
    };

    debug!("{}: falling back to {}", dimension, default);
    normalized.score = Some(default);
    normalized.fallback_reason = Some(format!("{}; using default score {}", cause, default));
    normalized
}
