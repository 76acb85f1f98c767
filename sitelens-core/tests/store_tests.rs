// Tests for report persistence

use sitelens_core::data::ReportStore;
use sitelens_core::orchestrator::{Orchestrator, Outcomes};
use sitelens_core::report::{ReportFormat, write_report};
use sitelens_core::request::AnalysisRequest;
use tempfile::TempDir;

fn sample() -> (AnalysisRequest, sitelens_core::CompositeReport) {
    let request = AnalysisRequest::parse("https://example.com", "seo")
        .unwrap()
        .with_business_name("Example Bakery")
        .unwrap();
    let selected = Orchestrator::select_analyzers(&request);
    let report = Orchestrator::assemble(&request, &selected, &Outcomes::new());
    (request, report)
}

#[test]
fn test_save_and_fetch_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("sitelens.db");

    assert!(!ReportStore::exists(&db_path));
    let store = ReportStore::open(&db_path).unwrap();
    assert!(ReportStore::exists(&db_path));

    let (request, report) = sample();
    let id = store.save(&request, &report).unwrap();

    let fetched = store.fetch(&id).unwrap().expect("report should be stored");
    assert_eq!(fetched, report);
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_fetch_unknown_id_is_none() {
    let store = ReportStore::in_memory().unwrap();
    assert!(store.fetch("does-not-exist").unwrap().is_none());
}

#[test]
fn test_reopen_keeps_existing_rows() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("sitelens.db");
    let (request, report) = sample();

    {
        let store = ReportStore::open(&db_path).unwrap();
        store.save(&request, &report).unwrap();
        store.save(&request, &report).unwrap();
    }

    let store = ReportStore::open(&db_path).unwrap();
    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn test_write_report_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("report.json");
    let (_, report) = sample();

    write_report(&report, ReportFormat::Json, &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["target"], "https://example.com/");
    assert_eq!(value["profile"], "seo");
    // seo 50, security 75
    assert_eq!(value["overall_score"], 63);
}
