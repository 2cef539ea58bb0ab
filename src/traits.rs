use serde_json::{Map, Value, json};

use crate::error::DeclarationError;
use crate::types::{ResourceType, StringValue};

/// Anything that becomes one entry of a template's `Resources` section,
/// e.g. an `AWS::IAM::Role` or an `AWS::SecretsManager::Secret`.
pub trait CfnResource {
    /// The CloudFormation type this declaration renders as.
    fn resource_type(&self) -> ResourceType;

    /// The id the resource is keyed by inside its stack.
    fn logical_id(&self) -> &str;

    /// The `Properties` block.
    fn cfn_properties(&self) -> Result<Map<String, Value>, DeclarationError>;

    /// Logical ids of other resources this one refers to, default is none.
    fn references(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Build the full template entry: `{"Type": ..., "Properties": ...}`.
    fn cfn_entity(&self) -> Result<Value, DeclarationError> {
        Ok(json!({
            "Type": self.resource_type().as_ref(),
            "Properties": Value::Object(self.cfn_properties()?),
        }))
    }

    /// `{"Ref": <logical id>}`.
    fn cfn_ref(&self) -> StringValue {
        StringValue::reference(self.logical_id())
    }

    /// `{"Fn::GetAtt": [<logical id>, <attribute>]}`.
    fn cfn_attr(&self, attribute: &str) -> StringValue {
        StringValue::get_att(self.logical_id(), attribute)
    }
}

/// Insert a serializable property value.
pub(crate) fn put<T: serde::Serialize>(
    props: &mut Map<String, Value>,
    key: &str,
    value: &T,
) -> Result<(), DeclarationError> {
    props.insert(key.to_string(), serde_json::to_value(value)?);
    Ok(())
}
