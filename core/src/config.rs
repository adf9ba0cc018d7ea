//! # INVOKER CONFIGURATION
//!
//! **PURPOSE**: Runtime knobs for invoker generation, supplied by the
//! embedding container (usually from its own JSON configuration).

use crate::errors::{error_codes, ConfigError};
use serde::{Deserialize, Serialize};

/// Default upper bound on parameter count.
pub const DEFAULT_MAX_ARITY: usize = 255;

/// Hard ceiling for `max_arity`.
pub const MAX_ARITY_LIMIT: usize = u16::MAX as usize;

/// **INVOKER CONFIGURATION**
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvokerConfig {
    /// **MAXIMUM ARITY** - Longer parameter lists are rejected as unsupported
    pub max_arity: usize,

    /// **RETURN VERIFICATION** - Check returned values, and Ref/Out slots after the
    /// call, against their declared types
    pub verify_return_type: bool,

    /// **INVOCATION LOGGING** - Emit a trace record for every call
    pub log_invocations: bool,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            max_arity: DEFAULT_MAX_ARITY,
            verify_return_type: true,
            log_invocations: false,
        }
    }
}

impl InvokerConfig {
    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: InvokerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_arity > MAX_ARITY_LIMIT {
            return Err(ConfigError::Invalid {
                code: error_codes::INVALID_CONFIG.to_string(),
                message: format!(
                    "max_arity {} exceeds the limit {}",
                    self.max_arity, MAX_ARITY_LIMIT
                ),
            });
        }
        Ok(())
    }

    pub fn with_max_arity(mut self, max_arity: usize) -> Self {
        self.max_arity = max_arity;
        self
    }

    pub fn with_return_verification(mut self, enabled: bool) -> Self {
        self.verify_return_type = enabled;
        self
    }

    pub fn with_invocation_logging(mut self, enabled: bool) -> Self {
        self.log_invocations = enabled;
        self
    }
}
