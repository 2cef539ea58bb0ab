//! String values that may only be known once the stack is deployed.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A string property: either a literal, or a reference the provisioning
/// engine resolves at apply time (`Ref` / `Fn::GetAtt`).
///
/// References are how one declared resource depends on another. Nothing
/// here ever holds the resolved value, so generated secrets stay out of
/// the declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StringValue {
    Literal(String),
    Ref(String),
    GetAtt { logical_id: String, attribute: String },
}

impl StringValue {
    pub fn literal(value: impl Into<String>) -> Self {
        StringValue::Literal(value.into())
    }

    pub fn reference(logical_id: impl Into<String>) -> Self {
        StringValue::Ref(logical_id.into())
    }

    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        StringValue::GetAtt {
            logical_id: logical_id.into(),
            attribute: attribute.into(),
        }
    }

    /// The logical id this value points at, if it is a reference.
    pub fn target(&self) -> Option<&str> {
        match self {
            StringValue::Literal(_) => None,
            StringValue::Ref(id) => Some(id),
            StringValue::GetAtt { logical_id, .. } => Some(logical_id),
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            StringValue::Literal(s) => Some(s),
            _ => None,
        }
    }
}

impl Display for StringValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StringValue::Literal(s) => write!(f, "{s}"),
            StringValue::Ref(id) => write!(f, "${{{id}}}"),
            StringValue::GetAtt {
                logical_id,
                attribute,
            } => write!(f, "${{{logical_id}.{attribute}}}"),
        }
    }
}

impl From<&str> for StringValue {
    fn from(value: &str) -> Self {
        StringValue::literal(value)
    }
}

impl From<String> for StringValue {
    fn from(value: String) -> Self {
        StringValue::Literal(value)
    }
}

/// Renders in CloudFormation intrinsic form.
impl Serialize for StringValue {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            StringValue::Literal(s) => ser.serialize_str(s),
            StringValue::Ref(id) => {
                let mut m = ser.serialize_map(Some(1))?;
                m.serialize_entry("Ref", id)?;
                m.end()
            }
            StringValue::GetAtt {
                logical_id,
                attribute,
            } => {
                let mut m = ser.serialize_map(Some(1))?;
                m.serialize_entry("Fn::GetAtt", &[logical_id, attribute])?;
                m.end()
            }
        }
    }
}

/// A list that renders as a bare element when it holds exactly one entry,
/// the way the provisioning engine writes `Action` and `Resource`.
pub(crate) struct OneOrMany<'a, T>(pub &'a [T]);

impl<T: Serialize> Serialize for OneOrMany<'_, T> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0 {
            [single] => single.serialize(ser),
            many => {
                let mut seq = ser.serialize_seq(Some(many.len()))?;
                for item in many {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_literal_serializes_as_string() {
        let v = StringValue::literal("arn:aws:iam::111111111111:role/x");
        assert_eq!(
            serde_json::to_value(&v).unwrap(),
            json!("arn:aws:iam::111111111111:role/x")
        );
    }

    #[test]
    fn test_ref_serializes_as_intrinsic() {
        let v = StringValue::reference("DeployUser");
        assert_eq!(serde_json::to_value(&v).unwrap(), json!({"Ref": "DeployUser"}));
        assert_eq!(v.target(), Some("DeployUser"));
    }

    #[test]
    fn test_get_att_serializes_as_intrinsic() {
        let v = StringValue::get_att("ExecRole", "Arn");
        assert_eq!(
            serde_json::to_value(&v).unwrap(),
            json!({"Fn::GetAtt": ["ExecRole", "Arn"]})
        );
        assert_eq!(v.to_string(), "${ExecRole.Arn}");
    }

    #[test]
    fn test_literal_has_no_target() {
        let v: StringValue = "*".into();
        assert_eq!(v.target(), None);
        assert_eq!(v.as_literal(), Some("*"));
    }

    #[test]
    fn test_one_or_many() {
        assert_eq!(serde_json::to_value(OneOrMany(&["a"])).unwrap(), json!("a"));
        assert_eq!(
            serde_json::to_value(OneOrMany(&["a", "b"])).unwrap(),
            json!(["a", "b"])
        );
        let empty: [&str; 0] = [];
        assert_eq!(serde_json::to_value(OneOrMany(&empty)).unwrap(), json!([]));
    }
}
