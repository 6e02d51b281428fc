//! Error types for upstream flight sources.

use std::fmt;

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Structured context for source errors.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation being performed (e.g. "fetch_flights", "read_fixture")
    pub operation: Option<String>,
    /// Name of the source involved (e.g. "schiphol", "static")
    pub source: Option<String>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref source) = self.source {
            parts.push(format!("source={}", source));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for flight source operations
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Transport-level failure (connection refused, TLS, DNS).
    #[error("HTTP error: {message} {context}")]
    Http {
        message: String,
        context: ErrorContext,
    },

    /// Upstream answered with a non-success status.
    #[error("Upstream returned status {status} {context}")]
    Status { status: u16, context: ErrorContext },

    /// Payload could not be decoded as JSON.
    #[error("Decode error: {message} {context}")]
    Decode {
        message: String,
        context: ErrorContext,
    },

    /// Local fixture could not be read.
    #[error("I/O error: {message} {context}")]
    Io {
        message: String,
        context: ErrorContext,
    },

    /// Fetch did not complete in time.
    #[error("Timeout after {seconds}s {context}")]
    Timeout { seconds: u64, context: ErrorContext },

    /// Source is missing credentials or otherwise misconfigured.
    #[error("Configuration error: {message} {context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },
}

impl SourceError {
    pub fn http(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Http {
            message: message.into(),
            context,
        }
    }

    pub fn status(status: u16, context: ErrorContext) -> Self {
        Self::Status { status, context }
    }

    pub fn decode(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Decode {
            message: message.into(),
            context,
        }
    }

    pub fn io(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Io {
            message: message.into(),
            context,
        }
    }

    pub fn timeout(seconds: u64, context: ErrorContext) -> Self {
        Self::Timeout { seconds, context }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Transient failures worth retrying on the next refresh.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { .. } | Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Http { context, .. }
            | Self::Status { context, .. }
            | Self::Decode { context, .. }
            | Self::Io { context, .. }
            | Self::Timeout { context, .. }
            | Self::Configuration { context, .. } => context,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        match &mut self {
            Self::Http { context, .. }
            | Self::Status { context, .. }
            | Self::Decode { context, .. }
            | Self::Io { context, .. }
            | Self::Timeout { context, .. }
            | Self::Configuration { context, .. } => {
                context.operation = Some(operation.into());
            }
        }
        self
    }
}
