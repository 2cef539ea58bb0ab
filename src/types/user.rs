//! IAM users and the inline policies attached to them.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::DeclarationError;
use crate::traits::{CfnResource, put};

use super::document::PolicyDocument;
use super::resource_type::ResourceType;
use super::value::StringValue;

/// A non-role identity, e.g. the user a CI system signs in as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    logical_id: String,
    user_name: String,
}

impl User {
    pub fn new(
        logical_id: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Result<Self, DeclarationError> {
        let logical_id = logical_id.into();
        let user_name = user_name.into();
        if user_name.is_empty() {
            return Err(DeclarationError::MissingField(format!("{logical_id}.user_name")));
        }
        debug!(
            event = "Declare",
            phase = "User",
            logical_id = logical_id.as_str(),
            user_name = user_name.as_str()
        );
        Ok(User {
            logical_id,
            user_name,
        })
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// `{"Ref": ...}` of a user resolves to its name.
    pub fn name_ref(&self) -> StringValue {
        self.cfn_ref()
    }

    pub fn arn(&self) -> StringValue {
        self.cfn_attr("Arn")
    }
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "User::{}({})", self.logical_id, self.user_name)
    }
}

impl CfnResource for User {
    fn resource_type(&self) -> ResourceType {
        ResourceType::User
    }

    fn logical_id(&self) -> &str {
        &self.logical_id
    }

    fn cfn_properties(&self) -> Result<Map<String, Value>, DeclarationError> {
        let mut props = Map::new();
        put(&mut props, "UserName", &self.user_name)?;
        Ok(props)
    }
}

/// A standalone `AWS::IAM::Policy` whose document is attached inline to
/// one or more users. The policy name is the document's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePolicy {
    logical_id: String,
    document: PolicyDocument,
    users: Vec<StringValue>,
}

impl InlinePolicy {
    /// Attach `document` to the given users (usually `User::name_ref`).
    pub fn for_users(
        logical_id: impl Into<String>,
        document: PolicyDocument,
        users: Vec<StringValue>,
    ) -> Result<Self, DeclarationError> {
        let logical_id = logical_id.into();
        if users.is_empty() {
            return Err(DeclarationError::MissingField(format!("{logical_id}.users")));
        }
        debug!(
            event = "Declare",
            phase = "Policy",
            logical_id = logical_id.as_str(),
            statements = document.len()
        );
        Ok(InlinePolicy {
            logical_id,
            document,
            users,
        })
    }

    pub fn document(&self) -> &PolicyDocument {
        &self.document
    }

    pub fn users(&self) -> &[StringValue] {
        &self.users
    }
}

impl CfnResource for InlinePolicy {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Policy
    }

    fn logical_id(&self) -> &str {
        &self.logical_id
    }

    fn references(&self) -> Vec<&str> {
        self.document
            .references()
            .chain(self.users.iter().filter_map(StringValue::target))
            .collect()
    }

    fn cfn_properties(&self) -> Result<Map<String, Value>, DeclarationError> {
        let mut props = Map::new();
        put(&mut props, "PolicyDocument", &self.document)?;
        put(&mut props, "PolicyName", &self.document.name())?;
        put(&mut props, "Users", &self.users)?;
        Ok(props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PolicyStatement;
    use serde_json::json;

    #[test]
    fn test_user_entity() {
        let user = User::new("DeployUser", "deploy-user").unwrap();
        assert_eq!(
            user.cfn_entity().unwrap(),
            json!({"Type": "AWS::IAM::User", "Properties": {"UserName": "deploy-user"}})
        );
        assert_eq!(user.arn(), StringValue::get_att("DeployUser", "Arn"));
        assert_eq!(user.name_ref(), StringValue::reference("DeployUser"));
    }

    #[test]
    fn test_user_requires_name() {
        assert!(User::new("DeployUser", "").is_err());
    }

    #[test]
    fn test_inline_policy_entity() {
        let user = User::new("DeployUser", "deploy-user").unwrap();
        let doc = PolicyDocument::new(
            "DeployPolicy",
            vec![PolicyStatement::allow(["sts:TagSession"], ["*"]).unwrap()],
        )
        .unwrap();
        let policy = InlinePolicy::for_users("DeployPolicy", doc, vec![user.name_ref()]).unwrap();

        assert_eq!(policy.references(), vec!["DeployUser"]);
        assert_eq!(
            policy.cfn_entity().unwrap(),
            json!({
                "Type": "AWS::IAM::Policy",
                "Properties": {
                    "PolicyDocument": {
                        "Statement": [{"Action": "sts:TagSession", "Effect": "Allow", "Resource": "*"}],
                        "Version": "2012-10-17"
                    },
                    "PolicyName": "DeployPolicy",
                    "Users": [{"Ref": "DeployUser"}]
                }
            })
        );
    }

    #[test]
    fn test_inline_policy_requires_users() {
        let doc = PolicyDocument::new("P", vec![PolicyStatement::allow(["a:b"], ["*"]).unwrap()])
            .unwrap();
        assert!(InlinePolicy::for_users("P", doc, Vec::new()).is_err());
    }
}
