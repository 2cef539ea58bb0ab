//! Exported stack outputs.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::value::StringValue;

/// A named value exported for other stacks or downstream automation.
///
/// Export names must be unique within the account and region the stack is
/// deployed to; `Stack` refuses duplicates within one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    logical_id: String,
    description: Option<String>,
    value: StringValue,
    export_name: Option<String>,
}

impl Output {
    pub fn new(logical_id: impl Into<String>, value: StringValue) -> Self {
        Output {
            logical_id: logical_id.into(),
            description: None,
            value,
            export_name: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_export_name(mut self, export_name: impl Into<String>) -> Self {
        self.export_name = Some(export_name.into());
        self
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn value(&self) -> &StringValue {
        &self.value
    }

    pub fn export_name(&self) -> Option<&str> {
        self.export_name.as_deref()
    }
}

impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.export_name {
            Some(export) => write!(f, "{} = {} (export {export})", self.logical_id, self.value),
            None => write!(f, "{} = {}", self.logical_id, self.value),
        }
    }
}

struct ExportBlock<'a>(&'a str);

impl Serialize for ExportBlock<'_> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut m = ser.serialize_map(Some(1))?;
        m.serialize_entry("Name", self.0)?;
        m.end()
    }
}

impl Serialize for Output {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut m = ser.serialize_map(None)?;
        if let Some(description) = &self.description {
            m.serialize_entry("Description", description)?;
        }
        if let Some(export) = &self.export_name {
            m.serialize_entry("Export", &ExportBlock(export))?;
        }
        m.serialize_entry("Value", &self.value)?;
        m.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_rendering() {
        let out = Output::new("RoleArn", StringValue::get_att("Role", "Arn"))
            .with_description("Role ARN")
            .with_export_name("ROLE-ARN");
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({
                "Description": "Role ARN",
                "Export": {"Name": "ROLE-ARN"},
                "Value": {"Fn::GetAtt": ["Role", "Arn"]}
            })
        );
        insta::assert_snapshot!(out.to_string(), @"RoleArn = ${Role.Arn} (export ROLE-ARN)");
    }

    #[test]
    fn test_output_without_export() {
        let out = Output::new("Plain", StringValue::literal("x"));
        assert_eq!(serde_json::to_value(&out).unwrap(), json!({"Value": "x"}));
        assert_eq!(out.export_name(), None);
    }
}
