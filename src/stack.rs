//! Stacks: the unit handed to the provisioning engine.

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::environment::StackEnvironment;
use crate::error::DeclarationError;
use crate::traits::CfnResource;
use crate::types::{Output, Resource, Role};

/// Template format version every rendered template declares.
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

static STACK_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9-]{0,127}$").expect("stack name pattern is valid")
});

static LOGICAL_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{1,255}$").expect("logical id pattern is valid"));

/// Collects resources and outputs in declaration order.
///
/// A resource or output may only refer to resources added before it, so a
/// finished stack never contains dangling or circular references.
#[derive(Debug)]
pub struct StackBuilder {
    name: String,
    description: Option<String>,
    environment: StackEnvironment,
    resources: Vec<Resource>,
    outputs: Vec<Output>,
    index: HashMap<String, usize>,
    exports: HashMap<String, String>,
}

impl StackBuilder {
    pub fn new(
        name: impl Into<String>,
        environment: StackEnvironment,
    ) -> Result<Self, DeclarationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(DeclarationError::MissingField("stack_name".to_string()));
        }
        if !STACK_NAME_PATTERN.is_match(&name) {
            return Err(DeclarationError::InvalidStackName(name));
        }
        Ok(StackBuilder {
            name,
            description: None,
            environment,
            resources: Vec::new(),
            outputs: Vec::new(),
            index: HashMap::new(),
            exports: HashMap::new(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn environment(&self) -> &StackEnvironment {
        &self.environment
    }

    /// Add a resource. Fails on a duplicate or malformed logical id, or when
    /// the resource refers to something not yet in the stack.
    pub fn add_resource(&mut self, resource: impl Into<Resource>) -> Result<(), DeclarationError> {
        let resource = resource.into();
        let id = resource.logical_id().to_string();

        check_logical_id(&id)?;
        if self.index.contains_key(&id) {
            return Err(DeclarationError::DuplicateLogicalId(id));
        }
        for target in resource.references() {
            self.check_declared(&id, target)?;
        }

        debug!(
            event = "Stack",
            phase = "AddResource",
            stack = self.name.as_str(),
            resource = resource.to_string()
        );
        self.index.insert(id, self.resources.len());
        self.resources.push(resource);
        Ok(())
    }

    /// Add an output. Fails on a duplicate logical id or export name, or a
    /// value that refers to an undeclared resource.
    pub fn add_output(&mut self, output: Output) -> Result<(), DeclarationError> {
        let id = output.logical_id();
        check_logical_id(id)?;
        if self.outputs.iter().any(|o| o.logical_id() == id) {
            return Err(DeclarationError::DuplicateLogicalId(id.to_string()));
        }
        if let Some(target) = output.value().target() {
            self.check_declared(id, target)?;
        }
        if let Some(export) = output.export_name() {
            if let Some(first) = self.exports.get(export) {
                return Err(DeclarationError::DuplicateExport {
                    export: export.to_string(),
                    first: first.clone(),
                    second: id.to_string(),
                });
            }
            self.exports.insert(export.to_string(), id.to_string());
        }

        debug!(
            event = "Stack",
            phase = "AddOutput",
            stack = self.name.as_str(),
            output = output.to_string()
        );
        self.outputs.push(output);
        Ok(())
    }

    pub fn build(self) -> Stack {
        info!(
            event = "Stack",
            phase = "Built",
            stack = self.name.as_str(),
            environment = self.environment.to_string(),
            resources = self.resources.len(),
            outputs = self.outputs.len()
        );
        Stack {
            name: self.name,
            description: self.description,
            environment: self.environment,
            resources: self.resources,
            outputs: self.outputs,
        }
    }

    fn check_declared(&self, from: &str, to: &str) -> Result<(), DeclarationError> {
        if self.index.contains_key(to) {
            Ok(())
        } else {
            Err(DeclarationError::UnknownReference {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }
}

fn check_logical_id(id: &str) -> Result<(), DeclarationError> {
    if LOGICAL_ID_PATTERN.is_match(id) {
        Ok(())
    } else {
        Err(DeclarationError::InvalidLogicalId(id.to_string()))
    }
}

/// A finished, immutable declaration of one deployable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack {
    name: String,
    description: Option<String>,
    environment: StackEnvironment,
    resources: Vec<Resource>,
    outputs: Vec<Output>,
}

impl Stack {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn environment(&self) -> &StackEnvironment {
        &self.environment
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.logical_id() == logical_id)
    }

    pub fn role(&self, logical_id: &str) -> Option<&Role> {
        self.resource(logical_id).and_then(Resource::as_role)
    }

    pub fn output(&self, logical_id: &str) -> Option<&Output> {
        self.outputs.iter().find(|o| o.logical_id() == logical_id)
    }

    /// Export names in declaration order.
    pub fn export_names(&self) -> Vec<&str> {
        self.outputs.iter().filter_map(Output::export_name).collect()
    }

    /// Render the CloudFormation template.
    pub fn to_template(&self) -> Result<Value, DeclarationError> {
        let mut resources = Map::new();
        for resource in &self.resources {
            resources.insert(resource.logical_id().to_string(), resource.cfn_entity()?);
        }

        let mut template = Map::new();
        template.insert("AWSTemplateFormatVersion".to_string(), json!(TEMPLATE_FORMAT_VERSION));
        if let Some(description) = &self.description {
            template.insert("Description".to_string(), json!(description));
        }
        template.insert("Resources".to_string(), Value::Object(resources));
        if !self.outputs.is_empty() {
            let mut outputs = Map::new();
            for output in &self.outputs {
                outputs.insert(output.logical_id().to_string(), serde_json::to_value(output)?);
            }
            template.insert("Outputs".to_string(), Value::Object(outputs));
        }
        Ok(Value::Object(template))
    }
}

impl Display for Stack {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} ({}): {} resources, {} outputs",
            self.name,
            self.environment,
            self.resources.len(),
            self.outputs.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccessKey, StringValue, User};
    use serde_json::json;

    fn builder() -> StackBuilder {
        let env = StackEnvironment::new("111111111111", "us-east-1").unwrap();
        StackBuilder::new("test-stack", env).unwrap()
    }

    #[test]
    fn test_duplicate_logical_id_rejected() {
        let mut b = builder();
        b.add_resource(User::new("DeployUser", "a").unwrap()).unwrap();
        let err = b.add_resource(User::new("DeployUser", "b").unwrap()).unwrap_err();
        assert!(matches!(err, DeclarationError::DuplicateLogicalId(id) if id == "DeployUser"));
    }

    #[test]
    fn test_reference_must_be_declared_first() {
        let mut b = builder();
        let err = b
            .add_resource(AccessKey::new("Key", StringValue::reference("DeployUser")))
            .unwrap_err();
        assert!(matches!(err, DeclarationError::UnknownReference { ref to, .. } if to == "DeployUser"));

        b.add_resource(User::new("DeployUser", "deploy-user").unwrap()).unwrap();
        b.add_resource(AccessKey::new("Key", StringValue::reference("DeployUser")))
            .unwrap();
        assert_eq!(b.build().resources().len(), 2);
    }

    #[test]
    fn test_duplicate_export_rejected() {
        let mut b = builder();
        let user = User::new("DeployUser", "deploy-user").unwrap();
        let arn = user.arn();
        b.add_resource(user).unwrap();
        b.add_output(Output::new("First", arn.clone()).with_export_name("SAME")).unwrap();
        let err = b
            .add_output(Output::new("Second", arn).with_export_name("SAME"))
            .unwrap_err();
        match err {
            DeclarationError::DuplicateExport {
                export,
                first,
                second,
            } => {
                assert_eq!(export, "SAME");
                assert_eq!(first, "First");
                assert_eq!(second, "Second");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_output_id_rejected() {
        let mut b = builder();
        b.add_output(Output::new("Out", StringValue::literal("a"))).unwrap();
        assert!(b.add_output(Output::new("Out", StringValue::literal("b"))).is_err());
    }

    #[test]
    fn test_output_reference_must_be_declared() {
        let mut b = builder();
        let err = b
            .add_output(Output::new("Out", StringValue::get_att("Missing", "Arn")))
            .unwrap_err();
        assert!(matches!(err, DeclarationError::UnknownReference { .. }));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let env = StackEnvironment::new("111111111111", "us-east-1").unwrap();
        assert!(matches!(
            StackBuilder::new("", env.clone()),
            Err(DeclarationError::MissingField(_))
        ));
        assert!(matches!(
            StackBuilder::new("1-starts-with-digit", env.clone()),
            Err(DeclarationError::InvalidStackName(_))
        ));
        assert!(matches!(
            StackBuilder::new("has_underscore", env),
            Err(DeclarationError::InvalidStackName(_))
        ));

        let mut b = builder();
        assert!(matches!(
            b.add_resource(User::new("Deploy-User", "x").unwrap()),
            Err(DeclarationError::InvalidLogicalId(_))
        ));
    }

    #[test]
    fn test_template_rendering() {
        let mut b = builder().with_description("demo");
        let user = User::new("DeployUser", "deploy-user").unwrap();
        let arn = user.arn();
        b.add_resource(user).unwrap();
        b.add_output(Output::new("UserArn", arn).with_export_name("USER-ARN")).unwrap();
        let stack = b.build();

        assert_eq!(stack.export_names(), vec!["USER-ARN"]);
        assert_eq!(
            stack.to_template().unwrap(),
            json!({
                "AWSTemplateFormatVersion": "2010-09-09",
                "Description": "demo",
                "Resources": {
                    "DeployUser": {"Type": "AWS::IAM::User", "Properties": {"UserName": "deploy-user"}}
                },
                "Outputs": {
                    "UserArn": {
                        "Export": {"Name": "USER-ARN"},
                        "Value": {"Fn::GetAtt": ["DeployUser", "Arn"]}
                    }
                }
            })
        );
        insta::assert_snapshot!(
            stack.to_string(),
            @"test-stack (aws://111111111111/us-east-1): 1 resources, 1 outputs"
        );
    }

    #[test]
    fn test_empty_stack_has_no_outputs_section() {
        let template = builder().build().to_template().unwrap();
        assert!(template.get("Outputs").is_none());
        assert_eq!(template["Resources"], json!({}));
    }
}
