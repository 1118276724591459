use menugraph_core_types::RequestId;
use thiserror::Error;

use crate::identity::Handle;

/// Result type alias using GraphError
pub type Result<T> = std::result::Result<T, GraphError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used for programmatic handling,
/// log assertions and CLI exit reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    NotFound,
    KindMismatch,
    ShapeMismatch,
    MissingField,
    DanglingReference,
    MalformedValue,

    // Transactions
    NotInTransaction,
    TransactionFailure,

    // Catalog
    RefreshFailure,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Config,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::KindMismatch => "ERR_KIND_MISMATCH",
            ExErrorKind::ShapeMismatch => "ERR_SHAPE_MISMATCH",
            ExErrorKind::MissingField => "ERR_MISSING_FIELD",
            ExErrorKind::DanglingReference => "ERR_DANGLING_REFERENCE",
            ExErrorKind::MalformedValue => "ERR_MALFORMED_VALUE",
            ExErrorKind::NotInTransaction => "ERR_NOT_IN_TRANSACTION",
            ExErrorKind::TransactionFailure => "ERR_TRANSACTION_FAILURE",
            ExErrorKind::RefreshFailure => "ERR_REFRESH_FAILURE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification plus optional context for debugging. This is the
/// error type of the persistence and CLI boundaries; the in-memory engine
/// reports [`GraphError`] and converts on the way out.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    handle: Option<String>,
    entity_kind: Option<String>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            handle: None,
            entity_kind: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add object handle context
    pub fn with_handle(mut self, handle: impl ToString) -> Self {
        self.handle = Some(handle.to_string());
        self
    }

    /// Add entity kind context
    pub fn with_entity_kind(mut self, kind: impl Into<String>) -> Self {
        self.entity_kind = Some(kind.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn handle(&self) -> Option<&str> {
        self.handle.as_deref()
    }

    pub fn entity_kind(&self) -> Option<&str> {
        self.entity_kind.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(kind) = &self.entity_kind {
            write!(f, " (entity_kind: {})", kind)?;
        }
        if let Some(handle) = &self.handle {
            write!(f, " (handle: {})", handle)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy of the object graph engine and catalog layer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    // ===== Structural Errors =====
    /// No live object with this handle
    #[error("Object not found: {handle}")]
    NotFound { handle: Handle },

    /// Object has a different entity kind than the caller expected
    #[error("Object {object} is a {found}, expected {expected}")]
    KindMismatch {
        object: String,
        expected: String,
        found: String,
    },

    /// Field value does not match the declared field shape
    #[error("Field '{field}' of {kind} is declared {expected} but holds {found}")]
    FieldShapeMismatch {
        kind: String,
        field: String,
        expected: String,
        found: String,
    },

    /// A field required by a typed view is absent
    #[error("{kind} object {handle} has no field '{field}'")]
    MissingField {
        kind: String,
        handle: String,
        field: String,
    },

    /// A persisted object may only reference live persisted objects
    #[error("Field '{field}' references {target}, which is not a live persisted object")]
    DanglingReference { field: String, target: String },

    /// Unparsable literal (decimal, handle, timestamp)
    #[error("Malformed value '{input}': {reason}")]
    MalformedValue { input: String, reason: String },

    // ===== Transaction Errors =====
    /// Mutation attempted without an open write transaction
    #[error("Cannot {op} outside a write transaction")]
    NotInWriteTransaction { op: String },

    /// The store could not open or commit a write transaction
    #[error("Transaction failed during {op}: {message}")]
    TransactionFailure { op: String, message: String },

    // ===== Catalog Errors =====
    /// Catalog source could not supply a payload
    #[error("Catalog refresh failed: {message}")]
    RefreshFailure { message: String },

    // ===== Generic Errors =====
    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GraphError {
    /// Build a transaction failure for the given operation
    pub fn transaction(op: impl Into<String>, message: impl Into<String>) -> Self {
        GraphError::TransactionFailure {
            op: op.into(),
            message: message.into(),
        }
    }
}

/// Conversion from GraphError to ExError
impl From<GraphError> for ExError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NotFound { handle } => ExError::new(ExErrorKind::NotFound)
                .with_handle(handle)
                .with_message("Object not found"),

            GraphError::KindMismatch {
                object,
                expected,
                found,
            } => ExError::new(ExErrorKind::KindMismatch)
                .with_handle(object)
                .with_entity_kind(found)
                .with_message(format!("Expected {}", expected)),

            GraphError::FieldShapeMismatch {
                kind,
                field,
                expected,
                found,
            } => ExError::new(ExErrorKind::ShapeMismatch)
                .with_entity_kind(kind)
                .with_message(format!(
                    "Field '{}' is declared {} but holds {}",
                    field, expected, found
                )),

            GraphError::MissingField {
                kind,
                handle,
                field,
            } => ExError::new(ExErrorKind::MissingField)
                .with_entity_kind(kind)
                .with_handle(handle)
                .with_message(format!("Missing field '{}'", field)),

            GraphError::DanglingReference { field, target } => {
                ExError::new(ExErrorKind::DanglingReference).with_message(format!(
                    "Field '{}' references non-persisted object {}",
                    field, target
                ))
            }

            GraphError::MalformedValue { input, reason } => {
                ExError::new(ExErrorKind::MalformedValue)
                    .with_message(format!("'{}': {}", input, reason))
            }

            GraphError::NotInWriteTransaction { op } => {
                ExError::new(ExErrorKind::NotInTransaction)
                    .with_op(op)
                    .with_message("No write transaction is open")
            }

            GraphError::TransactionFailure { op, message } => {
                ExError::new(ExErrorKind::TransactionFailure)
                    .with_op(op)
                    .with_message(message)
            }

            GraphError::RefreshFailure { message } => ExError::new(ExErrorKind::RefreshFailure)
                .with_op("catalog_refresh")
                .with_message(message),

            GraphError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            GraphError::Config { message } => {
                ExError::new(ExErrorKind::Config).with_message(message)
            }

            GraphError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to GraphError
impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::Serialization {
            message: err.to_string(),
        }
    }
}
