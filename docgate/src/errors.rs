use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for gateway operations.
///
/// Each kind describes a category of failure, so call sites can react to
/// the class of error rather than parsing messages.
///
/// # Examples
///
/// ```rust,ignore
/// use docgate::errors::{GatewayError, ErrorKind, GatewayResult};
///
/// fn example() -> GatewayResult<()> {
///     Err(GatewayError::new("store unreachable", ErrorKind::TransportFailure))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// Error during filter construction or evaluation
    FilterError,
    /// A route pattern failed to compile at registration time
    PatternError,
    /// The store was unreachable or rejected the query
    TransportFailure,
    /// A stored record could not be decoded into a document
    DecodeFailure,
    /// The store rejected a write request
    RequestFailure,
    /// A store-returned identifier had an unexpected type
    TypecastFailure,
    /// Invalid or missing configuration
    ConfigError,
    /// Generic IO error
    IOError,
    /// The operation is not valid in the current context
    InvalidOperation,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::FilterError => write!(f, "Filter error"),
            ErrorKind::PatternError => write!(f, "Pattern error"),
            ErrorKind::TransportFailure => write!(f, "Transport failure"),
            ErrorKind::DecodeFailure => write!(f, "Decode failure"),
            ErrorKind::RequestFailure => write!(f, "Request failure"),
            ErrorKind::TypecastFailure => write!(f, "Typecast failure"),
            ErrorKind::ConfigError => write!(f, "Config error"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom gateway error type.
///
/// `GatewayError` encapsulates the error message, kind, and optional cause.
/// It supports error chaining and backtraces for debugging.
///
/// The `GatewayResult<T>` type alias is equivalent to `Result<T, GatewayError>`
/// and is used throughout the codebase for operations that can fail.
#[derive(Clone)]
pub struct GatewayError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<GatewayError>>,
    backtrace: Atomic<Backtrace>,
}

impl GatewayError {
    /// Creates a new `GatewayError` with the specified message and error kind.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        GatewayError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `GatewayError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved for
    /// debugging.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    /// * `cause` - The underlying error that caused this error
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: GatewayError) -> Self {
        GatewayError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&Box<GatewayError>> {
        self.cause.as_ref()
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for gateway operations.
///
/// `GatewayResult<T>` is shorthand for `Result<T, GatewayError>`.
/// All fallible gateway operations return this type.
pub type GatewayResult<T> = Result<T, GatewayError>;

// From trait implementations for automatic error conversion
impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        GatewayError::new(&format!("IO error: {}", err), ErrorKind::IOError)
    }
}

impl From<std::string::FromUtf8Error> for GatewayError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        GatewayError::new(
            &format!("UTF-8 encoding error: {}", err),
            ErrorKind::DecodeFailure,
        )
    }
}

impl From<regex::Error> for GatewayError {
    fn from(err: regex::Error) -> Self {
        GatewayError::new(
            &format!("Invalid pattern: {}", err),
            ErrorKind::PatternError,
        )
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::new(&format!("JSON error: {}", err), ErrorKind::DecodeFailure)
    }
}

impl From<std::num::ParseIntError> for GatewayError {
    fn from(err: std::num::ParseIntError) -> Self {
        GatewayError::new(
            &format!("Integer parsing error: {}", err),
            ErrorKind::ConfigError,
        )
    }
}

impl From<String> for GatewayError {
    fn from(msg: String) -> Self {
        GatewayError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for GatewayError {
    fn from(msg: &str) -> Self {
        GatewayError::new(msg, ErrorKind::InternalError)
    }
}
