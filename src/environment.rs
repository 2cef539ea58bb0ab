//! The account and region a stack is deployed into.

use std::fmt::{Display, Formatter, Result as FmtResult};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::DeclarationError;

static ACCOUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{12}$").expect("account pattern is valid"));

static REGION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z]{2}(-gov|-iso[a-z]*)?-[a-z]+-[0-9]$").expect("region pattern is valid")
});

/// A validated deployment target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StackEnvironment {
    account: String,
    region: String,
}

impl StackEnvironment {
    /// Fails on anything that is not a 12-digit account id and a region
    /// code such as `us-east-1` or `us-gov-west-1`.
    pub fn new(
        account: impl Into<String>,
        region: impl Into<String>,
    ) -> Result<Self, DeclarationError> {
        let account = account.into();
        let region = region.into();

        if account.is_empty() {
            return Err(DeclarationError::MissingField("account".to_string()));
        }
        if !ACCOUNT_PATTERN.is_match(&account) {
            return Err(DeclarationError::InvalidAccount(account));
        }
        if region.is_empty() {
            return Err(DeclarationError::MissingField("region".to_string()));
        }
        if !REGION_PATTERN.is_match(&region) {
            return Err(DeclarationError::InvalidRegion(region));
        }

        Ok(StackEnvironment { account, region })
    }

    /// Build from optional inputs, reporting which one is absent.
    pub fn from_parts(
        account: Option<String>,
        region: Option<String>,
    ) -> Result<Self, DeclarationError> {
        let account = account.ok_or_else(|| DeclarationError::MissingField("account".to_string()))?;
        let region = region.ok_or_else(|| DeclarationError::MissingField("region".to_string()))?;
        Self::new(account, region)
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

/// `aws://<account>/<region>`
impl Display for StackEnvironment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "aws://{}/{}", self.account, self.region)
    }
}
