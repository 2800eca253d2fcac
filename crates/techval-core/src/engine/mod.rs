pub mod command;
pub mod fake;

use crate::errors::EngineError;
use crate::model::RawRecord;
use crate::validate::ValidationRequest;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

pub use command::CommandEngine;
pub use fake::FakeEngine;

/// Handle to the component that actually analyses an extension.
///
/// Implementations are constructed (bootstrapped) once and then invoked per
/// validation. Records are returned as the engine produced them; shape checks
/// happen in [`crate::validate::TechnicalValidator`].
#[async_trait]
pub trait ValidationEngine: Send + Sync {
    fn name(&self) -> &str;

    async fn validate(&self, request: &ValidationRequest) -> Result<Vec<RawRecord>, EngineError>;
}

/// `namespace/function` address of an engine entry point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryPoint {
    pub namespace: String,
    pub function: String,
}

impl FromStr for EntryPoint {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, function) = s.rsplit_once('/').ok_or_else(|| {
            EngineError::bootstrap(format!(
                "entry point '{s}' must have the form namespace/function"
            ))
        })?;
        if namespace.trim().is_empty() || function.trim().is_empty() {
            return Err(EngineError::bootstrap(format!(
                "entry point '{s}' has an empty namespace or function"
            )));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            function: function.to_string(),
        })
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.function)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_point_parses_and_displays() {
        let ep: EntryPoint = "alfresco-technical-validation.core/validate-java"
            .parse()
            .unwrap();
        assert_eq!(ep.namespace, "alfresco-technical-validation.core");
        assert_eq!(ep.function, "validate-java");
        assert_eq!(
            ep.to_string(),
            "alfresco-technical-validation.core/validate-java"
        );
    }

    #[test]
    fn entry_point_splits_on_last_slash() {
        let ep: EntryPoint = "a/b/c".parse().unwrap();
        assert_eq!(ep.namespace, "a/b");
        assert_eq!(ep.function, "c");
    }

    #[test]
    fn malformed_entry_points_fail_bootstrap() {
        for bad in ["validate-java", "/validate-java", "ns/", " / "] {
            let err = bad.parse::<EntryPoint>().unwrap_err();
            assert!(
                matches!(err, EngineError::Bootstrap { .. }),
                "{bad}: {err:?}"
            );
        }
    }
}
