//! Analysis orchestration.
//!
//! Resolves a profile to a set of analyzers, runs the independent ones
//! concurrently behind a worker limit, feeds their normalized output to the
//! AI insight pass, then normalizes, applies fallbacks, scores and aggregates
//! everything into one [`CompositeReport`].

use crate::aggregate::aggregate;
use crate::analyzer::{
    Analyzer, AnalyzerKind, AnalyzerOptions, AnalyzerOutcome, COMPETITORS_MODE, CONTEXT_OPTION,
    FailureKind, MODE_OPTION, Phase,
};
use crate::dimension::{Dimension, NormalizedDimension};
use crate::fallback::apply_fallback;
use crate::normalize::{derive_ux, normalize};
use crate::report::CompositeReport;
use crate::request::{AnalysisRequest, Profile, TargetDescriptor};
use crate::scoring::overall_score;
use futures::future::join_all;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const DEFAULT_WORKER_LIMIT: usize = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcomes keyed by the analyzer that produced them
pub type Outcomes = BTreeMap<AnalyzerKind, AnalyzerOutcome>;

pub struct Orchestrator {
    analyzers: HashMap<AnalyzerKind, Arc<dyn Analyzer>>,
    worker_limit: usize,
    timeout: Duration,
    timeouts: HashMap<AnalyzerKind, Duration>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            analyzers: HashMap::new(),
            worker_limit: DEFAULT_WORKER_LIMIT,
            timeout: DEFAULT_TIMEOUT,
            timeouts: HashMap::new(),
        }
    }

    /// Register an analyzer under its own kind, replacing any previous one
    pub fn with_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzers.insert(analyzer.kind(), analyzer);
        self
    }

    /// Maximum number of analyzers running at once (at least one)
    pub fn with_worker_limit(mut self, limit: usize) -> Self {
        self.worker_limit = limit.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_analyzer_timeout(mut self, kind: AnalyzerKind, timeout: Duration) -> Self {
        self.timeouts.insert(kind, timeout);
        self
    }

    pub fn registered(&self) -> Vec<AnalyzerKind> {
        let mut kinds: Vec<AnalyzerKind> = self.analyzers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    fn timeout_for(&self, kind: AnalyzerKind) -> Duration {
        self.timeouts.get(&kind).copied().unwrap_or(self.timeout)
    }

    /// Analyzers a request needs, in invocation order
    pub fn select_analyzers(request: &AnalysisRequest) -> Vec<AnalyzerKind> {
        let has_listing = request.business_target().is_some();
        let baseline = [AnalyzerKind::Technology, AnalyzerKind::Security];

        let mut selected = match request.profile() {
            Profile::Full => {
                let mut kinds = vec![
                    AnalyzerKind::Seo,
                    AnalyzerKind::Performance,
                    AnalyzerKind::Security,
                    AnalyzerKind::Technology,
                ];
                if has_listing {
                    kinds.push(AnalyzerKind::BusinessListing);
                }
                kinds.push(AnalyzerKind::AiInsight);
                kinds
            }
            Profile::Seo => [vec![AnalyzerKind::Seo], baseline.to_vec()].concat(),
            Profile::Performance => [vec![AnalyzerKind::Performance], baseline.to_vec()].concat(),
            // without a business target the listing analyzer still runs and
            // fails as unsupported_target
            Profile::Competitors => [vec![AnalyzerKind::BusinessListing], baseline.to_vec()].concat(),
            Profile::Business => vec![AnalyzerKind::BusinessListing],
        };

        selected.sort();
        selected.dedup();
        selected
    }

    /// Dimensions the report will contain for a set of selected analyzers
    pub fn report_dimensions(profile: Profile, selected: &[AnalyzerKind]) -> Vec<Dimension> {
        let mut dimensions: Vec<Dimension> = selected.iter().map(|kind| kind.dimension()).collect();
        if profile == Profile::Full && !selected.is_empty() {
            dimensions.push(Dimension::Ux);
        }
        dimensions.sort();
        dimensions.dedup();
        dimensions
    }

    /// Target an analyzer receives, or `None` when the request cannot feed it
    fn target_for(kind: AnalyzerKind, request: &AnalysisRequest) -> Option<TargetDescriptor> {
        match kind {
            AnalyzerKind::BusinessListing => {
                request.business_target().map(TargetDescriptor::Business)
            }
            AnalyzerKind::AiInsight => Some(request.target().clone()),
            _ => request.target().url().map(|_| request.target().clone()),
        }
    }

    fn options_for(kind: AnalyzerKind, request: &AnalysisRequest) -> AnalyzerOptions {
        let mut options = AnalyzerOptions::new();
        options.insert(
            "profile".to_string(),
            Value::String(request.profile().as_str().to_string()),
        );
        if kind == AnalyzerKind::BusinessListing && request.profile() == Profile::Competitors {
            options.insert(
                MODE_OPTION.to_string(),
                Value::String(COMPETITORS_MODE.to_string()),
            );
        }
        options
    }

    /// Run a request end to end. Never fails: analyzer problems become
    /// fallback scores.
    pub async fn run(&self, request: &AnalysisRequest) -> CompositeReport {
        let selected = Self::select_analyzers(request);
        info!(
            "Analyzing {} (profile: {}) with {} analyzers",
            request.target(),
            request.profile(),
            selected.len()
        );

        if selected.is_empty() {
            warn!(
                "No analyzers selected for profile '{}' and target {}",
                request.profile(),
                request.target()
            );
        }

        let (phase_one, phase_two): (Vec<AnalyzerKind>, Vec<AnalyzerKind>) = selected
            .iter()
            .copied()
            .partition(|kind| kind.phase() == Phase::Independent);

        let mut outcomes = self
            .invoke_all(&phase_one, request, |kind| Self::options_for(kind, request))
            .await;

        if !phase_two.is_empty() {
            let context = phase_one_context(&outcomes);
            let phase_two_outcomes = self
                .invoke_all(&phase_two, request, |kind| {
                    let mut options = Self::options_for(kind, request);
                    options.insert(CONTEXT_OPTION.to_string(), context.clone());
                    options
                })
                .await;
            outcomes.extend(phase_two_outcomes);
        }

        let failed = outcomes.values().filter(|o| !o.is_success()).count();
        info!(
            "Collected {} analyzer outcomes ({} failed)",
            outcomes.len(),
            failed
        );

        Self::assemble(request, &selected, &outcomes)
    }

    /// Invoke a group of analyzers concurrently. Each call is isolated: errors,
    /// timeouts and panics become a `Failure` outcome for that analyzer only.
    async fn invoke_all<F>(
        &self,
        kinds: &[AnalyzerKind],
        request: &AnalysisRequest,
        options_for: F,
    ) -> Outcomes
    where
        F: Fn(AnalyzerKind) -> AnalyzerOptions,
    {
        let semaphore = Arc::new(Semaphore::new(self.worker_limit));
        let mut outcomes = Outcomes::new();
        let mut tasks = Vec::new();

        for &kind in kinds {
            let Some(analyzer) = self.analyzers.get(&kind).cloned() else {
                warn!("No {} analyzer registered", kind);
                outcomes.insert(
                    kind,
                    AnalyzerOutcome::failure(
                        FailureKind::NotConfigured,
                        format!("no {} analyzer registered", kind),
                    ),
                );
                continue;
            };

            let Some(target) = Self::target_for(kind, request) else {
                warn!("{} analyzer cannot analyze target {}", kind, request.target());
                outcomes.insert(
                    kind,
                    AnalyzerOutcome::failure(
                        FailureKind::UnsupportedTarget,
                        format!("{} analysis needs a different target than {}", kind, request.target()),
                    ),
                );
                continue;
            };

            let options = options_for(kind);
            let timeout = self.timeout_for(kind);
            let semaphore = semaphore.clone();

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return AnalyzerOutcome::failure(
                        FailureKind::Unavailable,
                        "worker pool closed before the analyzer could run",
                    );
                };

                debug!("Invoking {} analyzer", kind);
                match tokio::time::timeout(timeout, analyzer.invoke(&target, &options)).await {
                    Ok(Ok(payload)) => {
                        debug!("{} analyzer succeeded", kind);
                        AnalyzerOutcome::success(payload)
                    }
                    Ok(Err(e)) => {
                        warn!("{} analyzer failed: {}", kind, e);
                        e.into()
                    }
                    Err(_) => {
                        warn!("{} analyzer timed out after {:?}", kind, timeout);
                        AnalyzerOutcome::failure(
                            FailureKind::Timeout,
                            format!("no response within {:?}", timeout),
                        )
                    }
                }
            });

            tasks.push((kind, handle));
        }

        let (kinds, handles): (Vec<AnalyzerKind>, Vec<_>) = tasks.into_iter().unzip();
        let mut tasks = AbortOnDrop(handles);
        let joined = join_all(tasks.0.iter_mut()).await;
        for (kind, joined) in kinds.into_iter().zip(joined) {
            let outcome = joined.unwrap_or_else(|e| {
                warn!("{} analyzer task failed: {}", kind, e);
                AnalyzerOutcome::failure(
                    FailureKind::Unavailable,
                    format!("analyzer task failed: {}", e),
                )
            });
            outcomes.insert(kind, outcome);
        }

        outcomes
    }

    /// Pure assembly stage: normalize, derive UX, apply fallbacks, score and
    /// aggregate. Identical outcomes always produce an identical report.
    pub fn assemble(
        request: &AnalysisRequest,
        selected: &[AnalyzerKind],
        outcomes: &Outcomes,
    ) -> CompositeReport {
        let mut dimensions: BTreeMap<Dimension, NormalizedDimension> = BTreeMap::new();

        for dimension in Self::report_dimensions(request.profile(), selected) {
            dimensions.insert(dimension, NormalizedDimension::empty());
        }

        for &kind in selected {
            if let Some(outcome) = outcomes.get(&kind) {
                dimensions.insert(kind.dimension(), normalize(outcome, kind));
            }
        }

        if dimensions.contains_key(&Dimension::Ux) {
            let ux = derive_ux(&dimensions);
            dimensions.insert(Dimension::Ux, ux);
        }

        let dimensions: BTreeMap<Dimension, NormalizedDimension> = dimensions
            .into_iter()
            .map(|(dimension, normalized)| (dimension, apply_fallback(normalized, dimension)))
            .collect();

        let overall = overall_score(&dimensions);
        let narrative = aggregate(&dimensions);

        CompositeReport {
            target: request.target().to_string(),
            profile: request.profile(),
            overall_score: overall,
            dimensions,
            strengths: narrative.strengths,
            weaknesses: narrative.weaknesses,
            recommendations: narrative.recommendations,
        }
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Aborts analyzer tasks still running when a request is dropped mid-flight
struct AbortOnDrop(Vec<JoinHandle<AnalyzerOutcome>>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Phase-1 normalized dimensions as JSON for the AI insight pass
fn phase_one_context(outcomes: &Outcomes) -> Value {
    let context: BTreeMap<Dimension, NormalizedDimension> = outcomes
        .iter()
        .filter(|(kind, _)| kind.phase() == Phase::Independent)
        .map(|(kind, outcome)| (kind.dimension(), normalize(outcome, *kind)))
        .collect();

    serde_json::to_value(&context).unwrap_or(Value::Null)
}
