use crate::engine::ValidationEngine;
use crate::errors::ValidationError;
use crate::model::CriterionResult;
use crate::report::summary::Summary;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

pub const FIELD_SOURCE_LOCATION: &str = "sourceLocation";
pub const FIELD_BINARY_LOCATION: &str = "binaryLocation";
pub const FIELD_NEO4J_URL: &str = "neo4jUrl";

/// The three inputs of a validation, already checked to be non-blank.
///
/// Values are kept exactly as given; surrounding whitespace is not stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationRequest {
    #[serde(rename = "sourceLocation")]
    source_location: String,
    #[serde(rename = "binaryLocation")]
    binary_location: String,
    #[serde(rename = "neo4jUrl")]
    neo4j_url: String,
}

impl ValidationRequest {
    pub fn new(
        source_location: impl Into<String>,
        binary_location: impl Into<String>,
        neo4j_url: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::from_optional(
            Some(source_location.into()),
            Some(binary_location.into()),
            Some(neo4j_url.into()),
        )
    }

    /// `None` is treated like a blank value.
    pub fn from_optional(
        source_location: Option<String>,
        binary_location: Option<String>,
        neo4j_url: Option<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            source_location: require_non_blank(FIELD_SOURCE_LOCATION, source_location)?,
            binary_location: require_non_blank(FIELD_BINARY_LOCATION, binary_location)?,
            neo4j_url: require_non_blank(FIELD_NEO4J_URL, neo4j_url)?,
        })
    }

    pub fn source_location(&self) -> &str {
        &self.source_location
    }

    pub fn binary_location(&self) -> &str {
        &self.binary_location
    }

    pub fn neo4j_url(&self) -> &str {
        &self.neo4j_url
    }
}

fn require_non_blank(
    field: &'static str,
    value: Option<String>,
) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::InvalidArgument { field }),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub engine: String,
    pub request: ValidationRequest,
    pub results: Vec<CriterionResult>,
    pub summary: Summary,
    pub duration_ms: u64,
}

/// Validates extensions by delegating to an injected [`ValidationEngine`].
#[derive(Clone)]
pub struct TechnicalValidator {
    engine: Arc<dyn ValidationEngine>,
}

impl TechnicalValidator {
    pub fn new(engine: Arc<dyn ValidationEngine>) -> Self {
        Self { engine }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Check the inputs, then hand them to the engine.
    ///
    /// Precondition failures are returned before the engine is touched.
    /// Engine errors are returned unchanged.
    pub async fn validate(
        &self,
        source_location: &str,
        binary_location: &str,
        neo4j_url: &str,
    ) -> Result<Vec<CriterionResult>, ValidationError> {
        let request = ValidationRequest::new(source_location, binary_location, neo4j_url)?;
        self.validate_request(&request).await
    }

    pub async fn validate_request(
        &self,
        request: &ValidationRequest,
    ) -> Result<Vec<CriterionResult>, ValidationError> {
        tracing::info!(
            engine = self.engine_name(),
            source = request.source_location(),
            binary = request.binary_location(),
            neo4j_url = request.neo4j_url(),
            "validating extension"
        );

        let records = self.engine.validate(request).await?;

        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                CriterionResult::from_record(record)
                    .map_err(|reason| ValidationError::MalformedResult { index, reason })
            })
            .collect()
    }

    /// Like [`Self::validate_request`], with summary and timing attached.
    pub async fn run(&self, request: &ValidationRequest) -> Result<ValidationReport, ValidationError> {
        let started = Instant::now();
        let results = self.validate_request(request).await?;
        let duration_ms = started.elapsed().as_millis() as u64;
        let summary = Summary::from_results(&results);

        tracing::info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            manual = summary.manual,
            not_checked = summary.not_checked,
            duration_ms,
            "validation finished"
        );

        Ok(ValidationReport {
            engine: self.engine_name().to_string(),
            request: request.clone(),
            results,
            summary,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_inputs_are_rejected_in_order() {
        let cases = [
            ("", "b", "n", "sourceLocation"),
            ("   ", "b", "n", "sourceLocation"),
            ("s", "\t\n", "n", "binaryLocation"),
            ("s", "b", "", "neo4jUrl"),
            ("", "", "", "sourceLocation"),
        ];
        for (s, b, n, field) in cases {
            match ValidationRequest::new(s, b, n) {
                Err(ValidationError::InvalidArgument { field: got }) => assert_eq!(got, field),
                other => panic!("expected InvalidArgument for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_inputs_count_as_null() {
        let err = ValidationRequest::from_optional(Some("s".into()), None, Some("n".into()))
            .unwrap_err();
        assert_eq!(err.to_string(), "binaryLocation must not be null, empty or blank.");
    }

    #[test]
    fn values_are_kept_verbatim() {
        let req = ValidationRequest::new(" /src ", "/bin", "bolt://db:7687").unwrap();
        assert_eq!(req.source_location(), " /src ");
        assert_eq!(req.binary_location(), "/bin");
        assert_eq!(req.neo4j_url(), "bolt://db:7687");
    }

    #[test]
    fn request_serializes_with_wire_names() {
        let req = ValidationRequest::new("/src", "/bin", "http://db").unwrap();
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "sourceLocation": "/src",
                "binaryLocation": "/bin",
                "neo4jUrl": "http://db"
            })
        );
    }
}
