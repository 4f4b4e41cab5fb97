use std::fmt;

/// Result type alias for the assembly pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors. Any of these aborts the build before an artifact is written.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Two distinct routes produced the same operationId.
    #[error("ambiguous operationId `{operation_id}`: claimed by route `{first}` and route `{second}`")]
    Ambiguity {
        operation_id: String,
        first: String,
        second: String,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Constraint violations raised by value-object constructors and setters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("`{0}` is not a supported HTTP method (expected one of get, put, post, patch, delete)")]
    InvalidHttpMethod(String),

    #[error("`{0}` is not a valid response key (expected a status code, a class such as 5XX, or default)")]
    InvalidResponseKey(String),

    #[error("duplicate parameter `{name}` in {location}")]
    DuplicateParameter { name: String, location: String },

    #[error("a request body is not allowed on {0} operations")]
    RequestBodyNotAllowed(String),

    #[error("schema reference `{reference}` in {context} does not resolve to a component schema")]
    UnresolvedReference { reference: String, context: String },

    #[error("parameter name must not be empty")]
    EmptyParameterName,
}

/// Non-fatal diagnostics collected alongside a best-effort document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The route's handler is unknown to the annotation source; only route defaults were used.
    HandlerUnresolved { route: String, handler: String },
    /// The operation has no 2XX response.
    MissingSuccessResponse { path: String, method: String },
    /// A later route mapped the same path and verb as an earlier one and was skipped.
    DuplicateRoute {
        path: String,
        method: String,
        route: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::HandlerUnresolved { route, handler } => write!(
                f,
                "route `{}`: handler `{}` could not be resolved, annotations skipped",
                route, handler
            ),
            Warning::MissingSuccessResponse { path, method } => {
                write!(f, "{} {}: no 2XX response defined", method, path)
            }
            Warning::DuplicateRoute {
                path,
                method,
                route,
            } => write!(
                f,
                "route `{}`: {} {} is already defined by an earlier route, skipped",
                route, method, path
            ),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(format!("YAML: {}", err))
    }
}
