use thiserror::Error;

/// ACL error types
///
/// Matching itself never fails; these only surface from opt-in rule
/// validation and from loading rule files.
#[derive(Error, Debug)]
pub enum AclError {
    #[error("Malformed rule '{rule}': {reason}")]
    MalformedRule { rule: String, reason: String },

    #[error("Parse error at line {line}: {message}")]
    ParseErrorAtLine { line: usize, message: String },

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl AclError {
    pub(crate) fn malformed(rule: &str, reason: impl Into<String>) -> Self {
        AclError::MalformedRule {
            rule: rule.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AclError>;
