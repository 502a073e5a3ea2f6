//! Configuration errors

use super::BundlerError;

/// Creates a config not found error
pub fn not_found(path: impl Into<String>) -> BundlerError {
    BundlerError::ConfigNotFound { path: path.into() }
}

/// Creates a config parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> BundlerError {
    BundlerError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid config error
pub fn invalid(message: impl Into<String>) -> BundlerError {
    BundlerError::ConfigInvalid {
        message: message.into(),
    }
}

/// Creates an invalid grammar token error
pub fn grammar_invalid(token: impl Into<String>, reason: impl Into<String>) -> BundlerError {
    BundlerError::GrammarInvalid {
        token: token.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid plan error
pub fn plan_invalid(message: impl Into<String>) -> BundlerError {
    BundlerError::PlanInvalid {
        message: message.into(),
    }
}
