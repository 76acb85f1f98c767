pub mod client;
pub mod config;
pub mod error;
pub mod insight;
pub mod page;
pub mod payload;
pub mod performance;
pub mod places;
pub mod security;
pub mod seo;
pub mod technology;

pub use config::{AnalyzerConfig, default_analyzers};
pub use error::ScanError;
pub use insight::InsightAnalyzer;
pub use performance::PerformanceAnalyzer;
pub use places::PlacesAnalyzer;
pub use security::SecurityAnalyzer;
pub use seo::SeoAnalyzer;
pub use technology::TechnologyAnalyzer;
