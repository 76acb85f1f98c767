pub mod aggregate;
pub mod analyzer;
pub mod data;
pub mod dimension;
pub mod error;
pub mod fallback;
pub mod normalize;
pub mod orchestrator;
pub mod report;
pub mod request;
pub mod scoring;

pub use analyzer::{Analyzer, AnalyzerError, AnalyzerKind, AnalyzerOptions, AnalyzerOutcome, FailureKind, Payload};
pub use data::ReportStore;
pub use dimension::{Dimension, NormalizedDimension};
pub use error::EngineError;
pub use orchestrator::Orchestrator;
pub use report::{CompositeReport, ReportFormat};
pub use request::{AnalysisRequest, BusinessDescriptor, Profile, TargetDescriptor};
