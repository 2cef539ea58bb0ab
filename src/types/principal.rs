//! Principals that a trust statement names.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::arn::Arn;
use super::value::OneOrMany;

/// An identity that may assume a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Principal {
    /// An AWS service, e.g. `cloudformation.amazonaws.com`.
    Service(String),
    /// An account, user or role identified by ARN.
    Arn(Arn),
}

impl Principal {
    pub fn service(name: impl Into<String>) -> Self {
        Principal::Service(name.into())
    }

    /// The key this principal is listed under in a policy's `Principal` block.
    pub fn kind(&self) -> &'static str {
        match self {
            Principal::Service(_) => "Service",
            Principal::Arn(_) => "AWS",
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Principal::Service(name) => name,
            Principal::Arn(arn) => arn.as_str(),
        }
    }
}

impl From<Arn> for Principal {
    fn from(arn: Arn) -> Self {
        Principal::Arn(arn)
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}", self.kind(), self.identifier())
    }
}

/// Renders a set of principals as `{"AWS": ..., "Service": ...}`, grouping
/// by kind and collapsing single entries to a string.
pub(crate) struct PrincipalBlock<'a>(pub &'a [Principal]);

impl Serialize for PrincipalBlock<'_> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for principal in self.0 {
            grouped
                .entry(principal.kind())
                .or_default()
                .push(principal.identifier());
        }

        let mut m = ser.serialize_map(Some(grouped.len()))?;
        for (kind, ids) in &grouped {
            m.serialize_entry(kind, &OneOrMany(ids))?;
        }
        m.end()
    }
}
