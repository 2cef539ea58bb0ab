use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Serialize, Deserialize)]
pub enum DeclarationError {
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid account id '{0}' (expected 12 digits)")]
    InvalidAccount(String),

    #[error("invalid region '{0}'")]
    InvalidRegion(String),

    #[error("invalid ARN '{value}': {reason}")]
    InvalidArn { value: String, reason: String },

    #[error("statement {0} has no actions")]
    EmptyActions(String),

    #[error("statement {0} has no resources")]
    EmptyResources(String),

    #[error("duplicate statement id '{sid}' in policy document '{document}'")]
    DuplicateSid { document: String, sid: String },

    #[error("duplicate inline policy '{name}' on '{owner}'")]
    DuplicatePolicyName { owner: String, name: String },

    #[error("invalid stack name '{0}'")]
    InvalidStackName(String),

    #[error("invalid logical id '{0}' (expected 1-255 alphanumeric characters)")]
    InvalidLogicalId(String),

    #[error("duplicate logical id '{0}' in stack")]
    DuplicateLogicalId(String),

    #[error("'{from}' refers to '{to}', which is not declared before it")]
    UnknownReference { from: String, to: String },

    #[error("duplicate export name '{export}' (outputs '{first}' and '{second}')")]
    DuplicateExport {
        export: String,
        first: String,
        second: String,
    },

    #[error("parameter file error: {0}")]
    ParameterFile(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl From<std::io::Error> for DeclarationError {
    fn from(err: std::io::Error) -> Self {
        DeclarationError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DeclarationError {
    fn from(err: serde_json::Error) -> Self {
        DeclarationError::Json(err.to_string())
    }
}
