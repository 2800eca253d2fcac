use super::ValidationEngine;
use crate::errors::EngineError;
use crate::model::{CriterionResult, RawRecord};
use crate::validate::ValidationRequest;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum FakeResponse {
    Records(Vec<RawRecord>),
    Failed { status: Option<i32>, stderr: String },
    Timeout { secs: u64 },
}

/// In-memory engine with a canned answer. Records every call it receives.
#[derive(Debug)]
pub struct FakeEngine {
    response: FakeResponse,
    calls: AtomicUsize,
    last_request: Mutex<Option<ValidationRequest>>,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::with_records(Vec::new())
    }
}

impl FakeEngine {
    pub fn with_records(records: Vec<RawRecord>) -> Self {
        Self::from_response(FakeResponse::Records(records))
    }

    pub fn with_results(results: &[CriterionResult]) -> Self {
        Self::with_records(results.iter().map(CriterionResult::to_record).collect())
    }

    pub fn failing(status: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::from_response(FakeResponse::Failed {
            status,
            stderr: stderr.into(),
        })
    }

    pub fn timing_out(secs: u64) -> Self {
        Self::from_response(FakeResponse::Timeout { secs })
    }

    fn from_response(response: FakeResponse) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ValidationRequest> {
        self.last_request
            .lock()
            .expect("fake engine request lock")
            .clone()
    }
}

#[async_trait]
impl ValidationEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    async fn validate(&self, request: &ValidationRequest) -> Result<Vec<RawRecord>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_request
            .lock()
            .expect("fake engine request lock") = Some(request.clone());

        match &self.response {
            FakeResponse::Records(records) => Ok(records.clone()),
            FakeResponse::Failed { status, stderr } => Err(EngineError::Failed {
                status: *status,
                stderr: stderr.clone(),
            }),
            FakeResponse::Timeout { secs } => Err(EngineError::Timeout { secs: *secs }),
        }
    }
}
