use thiserror::Error;

/// Boxed failure raised by a method body.
pub type MethodError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used across the invocation core.
pub type InvokeResult<T> = Result<T, InvokeError>;

/// **INVOCATION ERROR TAXONOMY**
///
/// Every failure surfaces synchronously to the immediate caller; nothing is
/// retried or swallowed.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The method description cannot be turned into an invoker.
    #[error("UNSUPPORTED SIGNATURE: {method} - {reason}")]
    UnsupportedSignature { method: String, reason: String },

    /// The target is absent or not assignable to the owning type.
    #[error("TARGET TYPE MISMATCH: {method} expects target of type {expected}, got {actual}")]
    TargetTypeMismatch {
        method: String,
        expected: String,
        actual: String,
    },

    /// The argument array length differs from the parameter count.
    #[error("ARITY MISMATCH: {method} takes {expected} argument(s), got {actual}")]
    ArityMismatch {
        method: String,
        expected: usize,
        actual: usize,
    },

    /// An argument slot holds a value the parameter cannot accept.
    #[error("ARGUMENT TYPE MISMATCH: {method} argument {index} expects {expected}, got {actual}")]
    ArgumentTypeMismatch {
        method: String,
        index: usize,
        expected: String,
        actual: String,
    },

    /// The method itself failed.
    #[error("TARGET INVOCATION FAILURE: {method} - {source}")]
    TargetInvocationFailure {
        method: String,
        #[source]
        source: MethodError,
    },
}

impl InvokeError {
    /// Stable error code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            InvokeError::UnsupportedSignature { .. } => error_codes::UNSUPPORTED_SIGNATURE,
            InvokeError::TargetTypeMismatch { .. } => error_codes::TARGET_TYPE_MISMATCH,
            InvokeError::ArityMismatch { .. } => error_codes::ARITY_MISMATCH,
            InvokeError::ArgumentTypeMismatch { .. } => error_codes::ARGUMENT_TYPE_MISMATCH,
            InvokeError::TargetInvocationFailure { .. } => error_codes::TARGET_INVOCATION_FAILURE,
        }
    }

    /// Display name of the method the failure concerns.
    pub fn method(&self) -> &str {
        match self {
            InvokeError::UnsupportedSignature { method, .. }
            | InvokeError::TargetTypeMismatch { method, .. }
            | InvokeError::ArityMismatch { method, .. }
            | InvokeError::ArgumentTypeMismatch { method, .. }
            | InvokeError::TargetInvocationFailure { method, .. } => method,
        }
    }
}

/// Misuse of a [`Frame`](crate::invoker::Frame) by a method body.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("FRAME ERROR: slot {index} out of range (frame has {len} slots)")]
    OutOfRange { index: usize, len: usize },

    #[error("FRAME ERROR: slot {index} is {mode}, cannot {operation}")]
    WrongMode {
        index: usize,
        mode: &'static str,
        operation: &'static str,
    },

    #[error("FRAME ERROR: slot {index} holds {actual}, requested {requested}")]
    WrongType {
        index: usize,
        requested: &'static str,
        actual: String,
    },

    #[error("FRAME ERROR: slot {index} is null")]
    Null { index: usize },

    #[error("FRAME ERROR: receiver is not a {expected}")]
    Receiver { expected: &'static str },

    #[error("FRAME ERROR: returned {actual}, declared return type is {expected}")]
    ReturnType { expected: String, actual: String },

    #[error("FRAME ERROR: slot {index} holds {actual} on return, declared {expected}")]
    SlotType {
        index: usize,
        expected: String,
        actual: String,
    },
}

/// Configuration could not be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CONFIG ERROR: {code} - {message}")]
    Invalid { code: String, message: String },

    #[error("CONFIG ERROR: malformed JSON - {0}")]
    Json(#[from] serde_json::Error),
}

/// **INVOCATION ERROR CODES**
pub mod error_codes {
    pub const UNSUPPORTED_SIGNATURE: &str = "RUST_CORE_INVOKE_UNSUPPORTED_SIGNATURE";
    pub const TARGET_TYPE_MISMATCH: &str = "RUST_CORE_INVOKE_TARGET_TYPE_MISMATCH";
    pub const ARITY_MISMATCH: &str = "RUST_CORE_INVOKE_ARITY_MISMATCH";
    pub const ARGUMENT_TYPE_MISMATCH: &str = "RUST_CORE_INVOKE_ARGUMENT_TYPE_MISMATCH";
    pub const TARGET_INVOCATION_FAILURE: &str = "RUST_CORE_INVOKE_TARGET_INVOCATION_FAILURE";
    pub const INVALID_CONFIG: &str = "RUST_CORE_CONFIG_INVALID";
}
