//! Contract of the validate operation against an injected engine.

use serde_json::json;
use std::sync::Arc;
use techval_core::engine::FakeEngine;
use techval_core::model::{CriteriaId, CriterionResult, RawRecord, Verdict};
use techval_core::{EngineError, ErrorKind, TechnicalValidator, ValidationError, ValidationRequest};

fn records(v: serde_json::Value) -> Vec<RawRecord> {
    v.as_array()
        .unwrap()
        .iter()
        .map(|r| r.as_object().cloned().unwrap())
        .collect()
}

fn engine_output() -> Vec<RawRecord> {
    records(json!([
        { "criteriaId": "API01", "checked": true, "passes": true },
        { "criteriaId": "API02", "checked": true, "passes": false,
          "message": "Uses non-public API:\n  org.alfresco.repo.node.NodeServicePolicies" },
        { "criteriaId": "SEC01", "checked": true },
        { "criteriaId": "DOC01", "checked": false }
    ]))
}

#[tokio::test]
async fn blank_inputs_never_reach_the_engine() {
    let engine = Arc::new(FakeEngine::with_records(engine_output()));
    let validator = TechnicalValidator::new(engine.clone());

    let cases = [
        ("", "/amp", "http://db", "sourceLocation"),
        ("  ", "/amp", "http://db", "sourceLocation"),
        ("/src", "", "http://db", "binaryLocation"),
        ("/src", "\t", "http://db", "binaryLocation"),
        ("/src", "/amp", "", "neo4jUrl"),
        ("/src", "/amp", " \n ", "neo4jUrl"),
    ];
    for (s, b, n, field) in cases {
        let err = validator.validate(s, b, n).await.unwrap_err();
        match err {
            ValidationError::InvalidArgument { field: got } => assert_eq!(got, field),
            other => panic!("expected precondition failure, got {other:?}"),
        }
    }
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn inputs_are_forwarded_unchanged() {
    let engine = Arc::new(FakeEngine::with_records(engine_output()));
    let validator = TechnicalValidator::new(engine.clone());

    validator
        .validate("/work/ext-src", "/work/ext.amp", "http://localhost:7474/db/data/")
        .await
        .unwrap();

    assert_eq!(engine.calls(), 1);
    let req = engine.last_request().unwrap();
    assert_eq!(req.source_location(), "/work/ext-src");
    assert_eq!(req.binary_location(), "/work/ext.amp");
    assert_eq!(req.neo4j_url(), "http://localhost:7474/db/data/");
}

#[tokio::test]
async fn every_result_has_id_and_checked_and_keeps_optionality() {
    let validator = TechnicalValidator::new(Arc::new(FakeEngine::with_records(engine_output())));
    let results = validator.validate("/src", "/amp", "http://db").await.unwrap();

    let verdicts: Vec<Verdict> = results.iter().map(|r| r.verdict()).collect();
    assert_eq!(
        verdicts,
        vec![Verdict::Pass, Verdict::Fail, Verdict::Manual, Verdict::NotChecked]
    );

    for r in &results {
        let wire = r.to_record();
        assert!(wire.contains_key("criteriaId"));
        assert!(wire.contains_key("checked"));
        for key in ["passes", "message"] {
            if let Some(v) = wire.get(key) {
                assert!(!v.is_null(), "{key} must be omitted rather than null");
            }
        }
    }
    assert_eq!(results[0].to_record().get("message"), None);
    assert_eq!(results[3].to_record().get("passes"), None);
}

#[tokio::test]
async fn repeated_calls_have_identical_shape() {
    let validator = TechnicalValidator::new(Arc::new(FakeEngine::with_records(engine_output())));
    let first = validator.validate("/src", "/amp", "http://db").await.unwrap();
    let second = validator.validate("/src", "/amp", "http://db").await.unwrap();

    let shape = |rs: &[techval_core::CriterionResult]| -> Vec<Vec<String>> {
        rs.iter()
            .map(|r| r.to_record().keys().cloned().collect())
            .collect()
    };
    assert_eq!(shape(&first), shape(&second));
}

#[tokio::test]
async fn engine_failures_pass_through_unmodified() {
    let stderr = "Exception in thread \"main\" java.net.ConnectException: Connection refused\n\tat neo4j";
    let validator =
        TechnicalValidator::new(Arc::new(FakeEngine::failing(Some(1), stderr)));

    let err = validator.validate("/src", "/amp", "http://db").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EngineFailed);
    match err {
        ValidationError::Engine(EngineError::Failed { status, stderr: got }) => {
            assert_eq!(status, Some(1));
            assert_eq!(got, stderr);
        }
        other => panic!("unexpected error {other:?}"),
    }

    let validator = TechnicalValidator::new(Arc::new(FakeEngine::timing_out(30)));
    let err = validator.validate("/src", "/amp", "http://db").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EngineTimeout);
}

#[tokio::test]
async fn malformed_records_are_reported_with_index() {
    let engine = FakeEngine::with_records(records(json!([
        { "criteriaId": "API01", "checked": true, "passes": true },
        { "criteriaId": "API02", "passes": false }
    ])));
    let validator = TechnicalValidator::new(Arc::new(engine));

    match validator.validate("/src", "/amp", "http://db").await.unwrap_err() {
        ValidationError::MalformedResult { index, reason } => {
            assert_eq!(index, 1);
            assert!(reason.contains("checked"), "{reason}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn run_attaches_summary() {
    let validator = TechnicalValidator::new(Arc::new(FakeEngine::with_records(engine_output())));
    let request = ValidationRequest::new("/src", "/amp", "http://db").unwrap();
    let report = validator.run(&request).await.unwrap();

    assert_eq!(report.engine, "fake");
    assert_eq!(report.summary.total, 4);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.manual, 1);
    assert_eq!(report.summary.not_checked, 1);
    assert!(!report.summary.gate_passed());
}

#[tokio::test]
async fn empty_engine_output_is_a_valid_result() {
    let validator = TechnicalValidator::new(Arc::new(FakeEngine::default()));
    let results = validator.validate("/src", "/amp", "http://db").await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn typed_results_survive_the_engine_boundary() {
    let expected = vec![
        CriterionResult::passed(CriteriaId::new("API01").unwrap(), None),
        CriterionResult::failed(CriteriaId::new("API03").unwrap(), Some("uses ws.jar".into())),
        CriterionResult::not_checked(CriteriaId::new("DOC01").unwrap()),
    ];
    let validator = TechnicalValidator::new(Arc::new(FakeEngine::with_results(&expected)));

    assert_eq!(validator.engine_name(), "fake");
    let results = validator.validate("/src", "/amp", "http://db").await.unwrap();
    assert_eq!(results, expected);
}
