//! Long-lived access keys and the secrets that hold them.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::DeclarationError;
use crate::traits::{CfnResource, put};

use super::resource_type::ResourceType;
use super::value::StringValue;

/// An access key pair for a user. The key material is generated by the
/// provisioning engine at apply time and only ever referenced here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessKey {
    logical_id: String,
    user_name: StringValue,
}

impl AccessKey {
    pub fn new(logical_id: impl Into<String>, user_name: StringValue) -> Self {
        let logical_id = logical_id.into();
        debug!(
            event = "Declare",
            phase = "AccessKey",
            logical_id = logical_id.as_str(),
            user = user_name.to_string()
        );
        AccessKey {
            logical_id,
            user_name,
        }
    }

    pub fn user_name(&self) -> &StringValue {
        &self.user_name
    }

    /// The access key id (`Ref` of the key resource).
    pub fn access_key_id(&self) -> StringValue {
        self.cfn_ref()
    }

    /// The secret half of the pair.
    pub fn secret_access_key(&self) -> StringValue {
        self.cfn_attr("SecretAccessKey")
    }
}

impl CfnResource for AccessKey {
    fn resource_type(&self) -> ResourceType {
        ResourceType::AccessKey
    }

    fn logical_id(&self) -> &str {
        &self.logical_id
    }

    fn references(&self) -> Vec<&str> {
        self.user_name.target().into_iter().collect()
    }

    fn cfn_properties(&self) -> Result<Map<String, Value>, DeclarationError> {
        let mut props = Map::new();
        put(&mut props, "UserName", &self.user_name)?;
        Ok(props)
    }
}

/// A named secret whose value is supplied by another resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret {
    logical_id: String,
    name: String,
    description: Option<String>,
    secret_string: StringValue,
}

impl Secret {
    pub fn new(
        logical_id: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        secret_string: StringValue,
    ) -> Result<Self, DeclarationError> {
        let logical_id = logical_id.into();
        let name = name.into();
        if name.is_empty() {
            return Err(DeclarationError::MissingField(format!("{logical_id}.name")));
        }
        debug!(
            event = "Declare",
            phase = "Secret",
            logical_id = logical_id.as_str(),
            name = name.as_str()
        );
        Ok(Secret {
            logical_id,
            name,
            description,
            secret_string,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn secret_string(&self) -> &StringValue {
        &self.secret_string
    }

    /// `Ref` of a secret resolves to its ARN.
    pub fn secret_arn(&self) -> StringValue {
        self.cfn_ref()
    }
}

impl CfnResource for Secret {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Secret
    }

    fn logical_id(&self) -> &str {
        &self.logical_id
    }

    fn references(&self) -> Vec<&str> {
        self.secret_string.target().into_iter().collect()
    }

    fn cfn_properties(&self) -> Result<Map<String, Value>, DeclarationError> {
        let mut props = Map::new();
        if let Some(description) = &self.description {
            put(&mut props, "Description", description)?;
        }
        put(&mut props, "Name", &self.name)?;
        put(&mut props, "SecretString", &self.secret_string)?;
        Ok(props)
    }
}
