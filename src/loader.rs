use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use tracing::debug;
use utoipa::ToSchema;

use crate::error::DeclarationError;

/// Where the tools-account parameter file is looked for by default.
pub const DEFAULT_PARAMETER_FILE: &str = "src/cdk-stack-param.json";

/// The tools-account parameter file.
///
/// ```json
/// {
///   "CROSS_ACCOUNT_ROLE_ARN": {
///     "dev": "arn:aws:iam::111111111111:role/git-action-cross-account-role",
///     "staging": "arn:aws:iam::222222222222:role/git-action-cross-account-role",
///     "prod": "arn:aws:iam::333333333333:role/git-action-cross-account-role"
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CrossAccountParameters {
    /// Cross-account role ARN keyed by deployment environment name.
    #[serde(rename = "CROSS_ACCOUNT_ROLE_ARN")]
    pub cross_account_role_arn: BTreeMap<String, String>,
}

/// Parse parameter file contents.
///
/// Malformed JSON maps to `DeclarationError::Json`; well-formed JSON of the
/// wrong shape (e.g. a missing `CROSS_ACCOUNT_ROLE_ARN` key) maps to
/// `DeclarationError::ParameterFile`.
///
/// Example:
/// ```rust
/// use deploy_trust::parse_parameters;
/// let params = parse_parameters(r#"
///     {"CROSS_ACCOUNT_ROLE_ARN": {"dev": "arn:aws:iam::111111111111:role/x"}}
/// "#).unwrap();
/// assert_eq!(params.cross_account_role_arn.len(), 1);
/// ```
pub fn parse_parameters(text: &str) -> Result<CrossAccountParameters, DeclarationError> {
    serde_json::from_str(text).map_err(|e| match e.classify() {
        Category::Data => DeclarationError::ParameterFile(e.to_string()),
        _ => DeclarationError::from(e),
    })
}

/// Read and parse a parameter file.
pub fn load_parameters(path: impl AsRef<Path>) -> Result<CrossAccountParameters, DeclarationError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        DeclarationError::ParameterFile(format!("cannot read {}: {e}", path.display()))
    })?;
    let params = parse_parameters(&text)?;
    debug!(
        event = "Load",
        phase = "Parameters",
        path = path.display().to_string(),
        environments = params.cross_account_role_arn.len()
    );
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PARAMS: &str = r#"{
        "CROSS_ACCOUNT_ROLE_ARN": {
            "dev": "arn:aws:iam::111111111111:role/git-action-cross-account-role",
            "staging": "arn:aws:iam::222222222222:role/git-action-cross-account-role",
            "prod": "arn:aws:iam::333333333333:role/git-action-cross-account-role"
        }
    }"#;

    #[test]
    fn test_parse_parameters() {
        let params = parse_parameters(PARAMS).unwrap();
        let envs: Vec<&str> = params.cross_account_role_arn.keys().map(String::as_str).collect();
        assert_eq!(envs, vec!["dev", "prod", "staging"]);
    }

    #[test]
    fn test_missing_key_is_parameter_error() {
        let err = parse_parameters(r#"{"OTHER": {}}"#).unwrap_err();
        match err {
            DeclarationError::ParameterFile(msg) => assert!(msg.contains("CROSS_ACCOUNT_ROLE_ARN")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_wrong_value_type_is_parameter_error() {
        let err = parse_parameters(r#"{"CROSS_ACCOUNT_ROLE_ARN": {"dev": 42}}"#).unwrap_err();
        assert!(matches!(err, DeclarationError::ParameterFile(_)));
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let err = parse_parameters(r#"{"CROSS_ACCOUNT_ROLE_ARN": {"#).unwrap_err();
        assert!(matches!(err, DeclarationError::Json(_)));
    }

    #[test]
    fn test_empty_mapping_parses() {
        let params = parse_parameters(r#"{"CROSS_ACCOUNT_ROLE_ARN": {}}"#).unwrap();
        assert!(params.cross_account_role_arn.is_empty());
    }

    #[test]
    fn test_load_parameters_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PARAMS.as_bytes()).unwrap();
        let params = load_parameters(file.path()).unwrap();
        assert_eq!(params.cross_account_role_arn.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_parameters("/nonexistent/params.json").unwrap_err();
        assert!(matches!(err, DeclarationError::ParameterFile(msg) if msg.contains("cannot read")));
    }
}
