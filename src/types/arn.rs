//! Amazon Resource Names.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DeclarationError;

static ARN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^arn:(aws[a-z-]*):([a-z0-9-]+):([a-z0-9-]*):([0-9]{12})?:(.+)$")
        .expect("ARN pattern is valid")
});

/// A parsed ARN: `arn:<partition>:<service>:<region>:<account>:<resource>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Arn {
    raw: String,
    partition: String,
    service: String,
    region: String,
    account: String,
    resource: String,
}

impl Arn {
    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parse an ARN that must name an IAM identity with an owning account,
    /// e.g. `arn:aws:iam::111111111111:user/ci`.
    pub fn parse_iam(s: &str) -> Result<Self, DeclarationError> {
        let arn = Arn::from_str(s)?;
        if arn.service != "iam" {
            return Err(invalid(s, format!("expected service 'iam', found '{}'", arn.service)));
        }
        if arn.account.is_empty() {
            return Err(invalid(s, "IAM ARNs must carry an account id"));
        }
        Ok(arn)
    }

    /// Parse an ARN that must name an IAM role.
    pub fn parse_role(s: &str) -> Result<Self, DeclarationError> {
        let arn = Arn::parse_iam(s)?;
        if !arn.resource.starts_with("role/") {
            return Err(invalid(s, "expected an IAM role ARN (resource 'role/...')"));
        }
        Ok(arn)
    }
}

fn invalid(value: &str, reason: impl Into<String>) -> DeclarationError {
    DeclarationError::InvalidArn {
        value: value.to_string(),
        reason: reason.into(),
    }
}

impl FromStr for Arn {
    type Err = DeclarationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = ARN_PATTERN.captures(s).ok_or_else(|| {
            invalid(
                s,
                "expected format arn:<partition>:<service>:<region>:<account>:<resource>",
            )
        })?;
        let part = |i: usize| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default();

        Ok(Arn {
            raw: s.to_string(),
            partition: part(1),
            service: part(2),
            region: part(3),
            account: part(4),
            resource: part(5),
        })
    }
}

impl TryFrom<String> for Arn {
    type Error = DeclarationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Arn::from_str(&value)
    }
}

impl From<Arn> for String {
    fn from(arn: Arn) -> Self {
        arn.raw
    }
}

impl Display for Arn {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.raw)
    }
}
