//! CloudFormation resource type names and the policy effect enum.
//!
//! Centralizes the type strings so they are not scattered through the
//! declarations as magic values.

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

/// The CloudFormation resource types this crate declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString)]
pub enum ResourceType {
    #[strum(serialize = "AWS::IAM::Role")]
    Role,
    #[strum(serialize = "AWS::IAM::User")]
    User,
    #[strum(serialize = "AWS::IAM::Policy")]
    Policy,
    #[strum(serialize = "AWS::IAM::AccessKey")]
    AccessKey,
    #[strum(serialize = "AWS::SecretsManager::Secret")]
    Secret,
}

/// Whether a statement grants or denies its actions.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    AsRefStr,
    Display,
    EnumString,
)]
pub enum Effect {
    #[default]
    Allow,
    Deny,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use yare::parameterized;

    #[parameterized(
        role = { ResourceType::Role, "AWS::IAM::Role" },
        user = { ResourceType::User, "AWS::IAM::User" },
        policy = { ResourceType::Policy, "AWS::IAM::Policy" },
        access_key = { ResourceType::AccessKey, "AWS::IAM::AccessKey" },
        secret = { ResourceType::Secret, "AWS::SecretsManager::Secret" },
    )]
    fn test_resource_type_names(kind: ResourceType, expected: &str) {
        assert_eq!(kind.as_ref(), expected);
        assert_eq!(kind.to_string(), expected);
        assert_eq!(ResourceType::from_str(expected).unwrap(), kind);
    }

    #[test]
    fn test_unknown_resource_type() {
        assert!(ResourceType::from_str("AWS::S3::Bucket").is_err());
    }

    #[test]
    fn test_effect_default_is_allow() {
        assert_eq!(Effect::default(), Effect::Allow);
        assert_eq!(Effect::Allow.as_ref(), "Allow");
        assert_eq!(Effect::from_str("Deny").unwrap(), Effect::Deny);
    }

    #[test]
    fn test_effect_serializes_as_plain_string() {
        assert_eq!(serde_json::to_value(Effect::Deny).unwrap(), "Deny");
    }
}
