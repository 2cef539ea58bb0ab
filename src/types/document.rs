//! Policy documents: ordered, named collections of statements.

use std::collections::HashSet;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::DeclarationError;

use super::statement::PolicyStatement;

/// The policy language version every rendered document declares.
pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDocument {
    name: String,
    statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    /// Build a document, keeping statement ids exactly as given.
    ///
    /// Explicit ids must be unique within the document.
    pub fn new(
        name: impl Into<String>,
        statements: Vec<PolicyStatement>,
    ) -> Result<Self, DeclarationError> {
        let document = PolicyDocument {
            name: name.into(),
            statements,
        };
        document.check_unique_sids()?;
        Ok(document)
    }

    /// Build a document where every statement without an id gets its
    /// zero-based position as id ("0", "1", ...).
    pub fn with_assigned_sids(
        name: impl Into<String>,
        mut statements: Vec<PolicyStatement>,
    ) -> Result<Self, DeclarationError> {
        for (i, statement) in statements.iter_mut().enumerate() {
            statement.set_sid_if_absent(i.to_string());
        }
        Self::new(name, statements)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Find a statement by id.
    pub fn statement(&self, sid: &str) -> Option<&PolicyStatement> {
        self.statements.iter().find(|s| s.sid() == Some(sid))
    }

    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().flat_map(PolicyStatement::references)
    }

    fn check_unique_sids(&self) -> Result<(), DeclarationError> {
        let mut seen = HashSet::new();
        for sid in self.statements.iter().filter_map(PolicyStatement::sid) {
            if !seen.insert(sid) {
                return Err(DeclarationError::DuplicateSid {
                    document: self.name.clone(),
                    sid: sid.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Renders `{"Statement": [...], "Version": "2012-10-17"}`; the name is
/// carried by whatever resource embeds the document.
impl Serialize for PolicyDocument {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut m = ser.serialize_map(Some(2))?;
        m.serialize_entry("Statement", &self.statements)?;
        m.serialize_entry("Version", POLICY_VERSION)?;
        m.end()
    }
}
