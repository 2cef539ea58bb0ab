//! IAM roles.

use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::DeclarationError;
use crate::traits::{CfnResource, put};

use super::document::PolicyDocument;
use super::resource_type::ResourceType;
use super::statement::PolicyStatement;
use super::value::StringValue;

/// Name of the trust policy document, used in error messages.
pub const TRUST_POLICY_NAME: &str = "AssumeRolePolicyDocument";

/// Everything a role is declared with.
///
/// The trust statements are collected up front, so a `Role` is complete the
/// moment it exists and is never patched afterwards.
#[derive(Debug, Clone, Default)]
pub struct RoleProps {
    pub logical_id: String,
    pub role_name: Option<String>,
    pub description: Option<String>,
    pub trust_statements: Vec<PolicyStatement>,
    pub inline_policies: Vec<PolicyDocument>,
}

/// An assumable identity with a trust policy and inline permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    logical_id: String,
    role_name: Option<String>,
    description: Option<String>,
    assume_role_policy: PolicyDocument,
    inline_policies: Vec<PolicyDocument>,
}

impl Role {
    pub fn new(props: RoleProps) -> Result<Self, DeclarationError> {
        if props.trust_statements.is_empty() {
            return Err(DeclarationError::MissingField(format!(
                "{}.trust_statements",
                props.logical_id
            )));
        }

        let mut names = HashSet::new();
        for policy in &props.inline_policies {
            if !names.insert(policy.name()) {
                return Err(DeclarationError::DuplicatePolicyName {
                    owner: props.logical_id.clone(),
                    name: policy.name().to_string(),
                });
            }
        }

        let assume_role_policy = PolicyDocument::new(TRUST_POLICY_NAME, props.trust_statements)?;

        debug!(
            event = "Declare",
            phase = "Role",
            logical_id = props.logical_id.as_str(),
            trust_statements = assume_role_policy.len(),
            inline_policies = props.inline_policies.len()
        );

        Ok(Role {
            logical_id: props.logical_id,
            role_name: props.role_name,
            description: props.description,
            assume_role_policy,
            inline_policies: props.inline_policies,
        })
    }

    pub fn role_name(&self) -> Option<&str> {
        self.role_name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn assume_role_policy(&self) -> &PolicyDocument {
        &self.assume_role_policy
    }

    pub fn inline_policies(&self) -> &[PolicyDocument] {
        &self.inline_policies
    }

    pub fn inline_policy(&self, name: &str) -> Option<&PolicyDocument> {
        self.inline_policies.iter().find(|p| p.name() == name)
    }

    /// The role's ARN, resolved at apply time.
    pub fn arn(&self) -> StringValue {
        self.cfn_attr("Arn")
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.role_name {
            Some(name) => write!(f, "Role::{}({name})", self.logical_id),
            None => write!(f, "Role::{}", self.logical_id),
        }
    }
}

impl CfnResource for Role {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Role
    }

    fn logical_id(&self) -> &str {
        &self.logical_id
    }

    fn references(&self) -> Vec<&str> {
        self.inline_policies
            .iter()
            .flat_map(PolicyDocument::references)
            .collect()
    }

    fn cfn_properties(&self) -> Result<Map<String, Value>, DeclarationError> {
        let mut props = Map::new();
        put(&mut props, "AssumeRolePolicyDocument", &self.assume_role_policy)?;
        if let Some(description) = &self.description {
            put(&mut props, "Description", description)?;
        }
        if !self.inline_policies.is_empty() {
            let policies: Vec<Value> = self
                .inline_policies
                .iter()
                .map(|p| -> Result<Value, DeclarationError> {
                    Ok(json!({
                        "PolicyDocument": serde_json::to_value(p)?,
                        "PolicyName": p.name(),
                    }))
                })
                .collect::<Result<_, _>>()?;
            props.insert("Policies".to_string(), Value::Array(policies));
        }
        if let Some(name) = &self.role_name {
            put(&mut props, "RoleName", name)?;
        }
        Ok(props)
    }
}
