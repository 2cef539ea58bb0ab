//! The closed set of resources a stack can hold.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde_json::{Map, Value};

use crate::error::DeclarationError;
use crate::traits::CfnResource;

use super::credentials::{AccessKey, Secret};
use super::resource_type::ResourceType;
use super::role::Role;
use super::user::{InlinePolicy, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Role(Role),
    User(User),
    Policy(InlinePolicy),
    AccessKey(AccessKey),
    Secret(Secret),
}

impl Resource {
    pub fn as_role(&self) -> Option<&Role> {
        match self {
            Resource::Role(role) => Some(role),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&User> {
        match self {
            Resource::User(user) => Some(user),
            _ => None,
        }
    }

    pub fn as_policy(&self) -> Option<&InlinePolicy> {
        match self {
            Resource::Policy(policy) => Some(policy),
            _ => None,
        }
    }

    pub fn as_access_key(&self) -> Option<&AccessKey> {
        match self {
            Resource::AccessKey(key) => Some(key),
            _ => None,
        }
    }

    pub fn as_secret(&self) -> Option<&Secret> {
        match self {
            Resource::Secret(secret) => Some(secret),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn CfnResource {
        match self {
            Resource::Role(r) => r,
            Resource::User(u) => u,
            Resource::Policy(p) => p,
            Resource::AccessKey(k) => k,
            Resource::Secret(s) => s,
        }
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {}", self.resource_type(), self.logical_id())
    }
}

/// Dispatch the CfnResource trait to the wrapped declaration.
impl CfnResource for Resource {
    fn resource_type(&self) -> ResourceType {
        self.inner().resource_type()
    }

    fn logical_id(&self) -> &str {
        self.inner().logical_id()
    }

    fn cfn_properties(&self) -> Result<Map<String, Value>, DeclarationError> {
        self.inner().cfn_properties()
    }

    fn references(&self) -> Vec<&str> {
        self.inner().references()
    }

    fn cfn_entity(&self) -> Result<Value, DeclarationError> {
        self.inner().cfn_entity()
    }
}

impl From<Role> for Resource {
    fn from(role: Role) -> Self {
        Resource::Role(role)
    }
}

impl From<User> for Resource {
    fn from(user: User) -> Self {
        Resource::User(user)
    }
}

impl From<InlinePolicy> for Resource {
    fn from(policy: InlinePolicy) -> Self {
        Resource::Policy(policy)
    }
}

impl From<AccessKey> for Resource {
    fn from(key: AccessKey) -> Self {
        Resource::AccessKey(key)
    }
}

impl From<Secret> for Resource {
    fn from(secret: Secret) -> Self {
        Resource::Secret(secret)
    }
}
