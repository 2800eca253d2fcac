use std::path::PathBuf;
use thiserror::Error;

/// Stable classification used by the CLI for exit codes and machine-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgs,
    Config,
    EngineBootstrap,
    EngineSpawn,
    EngineFailed,
    EngineTimeout,
    EngineProtocol,
    MalformedResult,
    Other,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgs => "invalid_args",
            ErrorKind::Config => "config",
            ErrorKind::EngineBootstrap => "engine_bootstrap",
            ErrorKind::EngineSpawn => "engine_spawn",
            ErrorKind::EngineFailed => "engine_failed",
            ErrorKind::EngineTimeout => "engine_timeout",
            ErrorKind::EngineProtocol => "engine_protocol",
            ErrorKind::MalformedResult => "malformed_result",
            ErrorKind::Other => "other",
        }
    }

    /// Classify an error that crossed an `anyhow` boundary.
    pub fn of(err: &anyhow::Error) -> Self {
        if let Some(e) = err.downcast_ref::<ValidationError>() {
            return e.kind();
        }
        if let Some(e) = err.downcast_ref::<EngineError>() {
            return e.kind();
        }
        if err.downcast_ref::<ConfigError>().is_some() {
            return ErrorKind::Config;
        }
        ErrorKind::Other
    }
}

/// Failures raised by (or while reaching) the external validation engine.
///
/// These are surfaced to callers as-is; nothing here retries or reinterprets
/// what the engine reported.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine bootstrap failed: {reason}")]
    Bootstrap { reason: String },

    #[error("failed to spawn engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("engine exited with {}: {stderr}", describe_status(.status))]
    Failed { status: Option<i32>, stderr: String },

    #[error("engine timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("engine output violates protocol: {reason}")]
    Protocol { reason: String },
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Bootstrap { .. } => ErrorKind::EngineBootstrap,
            EngineError::Spawn { .. } => ErrorKind::EngineSpawn,
            EngineError::Failed { .. } => ErrorKind::EngineFailed,
            EngineError::Timeout { .. } => ErrorKind::EngineTimeout,
            EngineError::Protocol { .. } => ErrorKind::EngineProtocol,
        }
    }

    pub fn bootstrap(reason: impl Into<String>) -> Self {
        EngineError::Bootstrap {
            reason: reason.into(),
        }
    }

    pub fn protocol(reason: impl Into<String>) -> Self {
        EngineError::Protocol {
            reason: reason.into(),
        }
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    /// `field` uses the wire names: `sourceLocation`, `binaryLocation`, `neo4jUrl`.
    #[error("{field} must not be null, empty or blank.")]
    InvalidArgument { field: &'static str },

    #[error("malformed criterion record at index {index}: {reason}")]
    MalformedResult { index: usize, reason: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::InvalidArgument { .. } => ErrorKind::InvalidArgs,
            ValidationError::MalformedResult { .. } => ErrorKind::MalformedResult,
            ValidationError::Engine(e) => e.kind(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
