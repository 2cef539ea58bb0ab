//! Policy statements.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::DeclarationError;

use super::principal::{Principal, PrincipalBlock};
use super::resource_type::Effect;
use super::value::{OneOrMany, StringValue};

/// One statement of a permission or trust policy.
///
/// Permission statements name resources; trust statements name principals.
/// Both kinds need at least one action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PolicyStatement {
    sid: Option<String>,
    effect: Effect,
    actions: Vec<String>,
    resources: Vec<StringValue>,
    principals: Vec<Principal>,
}

impl PolicyStatement {
    /// An `Allow` statement over `resources`.
    ///
    /// Fails when either list is empty. `"*"` is a valid resource.
    pub fn allow<A, R>(actions: A, resources: R) -> Result<Self, DeclarationError>
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<StringValue>,
    {
        Self::permission(Effect::Allow, actions, resources)
    }

    pub fn permission<A, R>(effect: Effect, actions: A, resources: R) -> Result<Self, DeclarationError>
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<StringValue>,
    {
        let statement = PolicyStatement {
            sid: None,
            effect,
            actions: actions.into_iter().map(Into::into).collect(),
            resources: resources.into_iter().map(Into::into).collect(),
            principals: Vec::new(),
        };
        if statement.actions.is_empty() {
            return Err(DeclarationError::EmptyActions(statement.label()));
        }
        if statement.resources.is_empty() {
            return Err(DeclarationError::EmptyResources(statement.label()));
        }
        Ok(statement)
    }

    /// An `Allow` trust statement letting `principal` perform `action`
    /// (`sts:AssumeRole`, `sts:TagSession`, ...) on the role that carries it.
    pub fn trust(principal: Principal, action: impl Into<String>) -> Self {
        PolicyStatement {
            sid: None,
            effect: Effect::Allow,
            actions: vec![action.into()],
            resources: Vec::new(),
            principals: vec![principal],
        }
    }

    /// Set an explicit statement id.
    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    pub(crate) fn set_sid_if_absent(&mut self, sid: String) {
        if self.sid.is_none() {
            self.sid = Some(sid);
        }
    }

    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn resources(&self) -> &[StringValue] {
        &self.resources
    }

    pub fn principals(&self) -> &[Principal] {
        &self.principals
    }

    /// Logical ids this statement refers to through its resources.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().filter_map(StringValue::target)
    }

    fn label(&self) -> String {
        match &self.sid {
            Some(sid) => format!("'{sid}'"),
            None => format!("[{}]", self.actions.join(", ")),
        }
    }
}

impl Display for PolicyStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {}", self.effect, self.actions.join(","))?;
        if !self.principals.is_empty() {
            let names: Vec<String> = self.principals.iter().map(|p| p.to_string()).collect();
            write!(f, " by {}", names.join(","))?;
        }
        if !self.resources.is_empty() {
            let names: Vec<String> = self.resources.iter().map(|r| r.to_string()).collect();
            write!(f, " on {}", names.join(","))?;
        }
        Ok(())
    }
}

impl Serialize for PolicyStatement {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut m = ser.serialize_map(None)?;
        m.serialize_entry("Action", &OneOrMany(&self.actions))?;
        m.serialize_entry("Effect", &self.effect)?;
        if !self.principals.is_empty() {
            m.serialize_entry("Principal", &PrincipalBlock(&self.principals))?;
        }
        if !self.resources.is_empty() {
            m.serialize_entry("Resource", &OneOrMany(&self.resources))?;
        }
        if let Some(sid) = &self.sid {
            m.serialize_entry("Sid", sid)?;
        }
        m.end()
    }
}
