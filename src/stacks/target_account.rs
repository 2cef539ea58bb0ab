//! The resources deployed into the account that receives deployments: an
//! execution role for the provisioning engine, and a role the tools account
//! assumes to drive deployments.

use tracing::info;

use crate::bootstrap::{STAGING_BUCKET_RESOURCES, bootstrap_role_arns};
use crate::environment::StackEnvironment;
use crate::error::DeclarationError;
use crate::stack::{Stack, StackBuilder};
use crate::types::{Arn, Output, PolicyDocument, PolicyStatement, Principal, Role, RoleProps};

pub const DEFAULT_STACK_NAME: &str = "cf-GitActionCrossAccountRolesStack";
pub const STACK_DESCRIPTION: &str =
    "Creates Cross Account Role and Cloudformation Execution Roles";

pub const EXECUTION_ROLE_ID: &str = "GitActionsCFExecutionRole";
pub const EXECUTION_ROLE_NAME: &str = "git-action-cf-execution-role";
pub const EXECUTION_POLICY_NAME: &str = "CFExecutionPolicy";
pub const EXECUTION_SERVICE_PRINCIPAL: &str = "cloudformation.amazonaws.com";

pub const CROSS_ACCOUNT_ROLE_ID: &str = "CrossAccountRole";
pub const CROSS_ACCOUNT_ROLE_NAME: &str = "git-action-cross-account-role";
pub const CROSS_ACCOUNT_POLICY_NAME: &str = "CrossAccountPolicy";

pub const EXECUTION_ROLE_OUTPUT: &str = "CFExecutionRoleArn";
pub const EXECUTION_ROLE_EXPORT: &str = "GIT-ACTIONS-CF-EXECUTION-ROLE-ARN";
pub const CROSS_ACCOUNT_ROLE_OUTPUT: &str = "CrossAccountRoleArn";
pub const CROSS_ACCOUNT_ROLE_EXPORT: &str = "GIT-ACTIONS-CROSS-ACCOUNT-ROLE-ARN";

/// Inputs for the target-account stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetAccountConfig {
    environment: StackEnvironment,
    trusted_principal: Arn,
    stack_name: String,
}

impl TargetAccountConfig {
    /// `trusted_principal_arn` is the identity in the tools account allowed to
    /// assume the cross-account role. Absent, empty, or the text `undefined`
    /// is reported as a missing field rather than written into the policy.
    pub fn new(
        environment: StackEnvironment,
        trusted_principal_arn: Option<&str>,
    ) -> Result<Self, DeclarationError> {
        let raw = trusted_principal_arn
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "undefined")
            .ok_or_else(|| DeclarationError::MissingField("trusted_principal_arn".to_string()))?;
        let trusted_principal = Arn::parse_iam(raw)?;

        Ok(TargetAccountConfig {
            environment,
            trusted_principal,
            stack_name: DEFAULT_STACK_NAME.to_string(),
        })
    }

    pub fn with_stack_name(mut self, stack_name: impl Into<String>) -> Self {
        self.stack_name = stack_name.into();
        self
    }

    pub fn environment(&self) -> &StackEnvironment {
        &self.environment
    }

    pub fn trusted_principal(&self) -> &Arn {
        &self.trusted_principal
    }

    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }
}

/// The role the provisioning engine runs as while creating resources.
pub fn declare_execution_role() -> Result<Role, DeclarationError> {
    let statements = vec![
        PolicyStatement::allow(
            [
                "iam:Get*",
                "iam:List*",
                "iam:*Role*",
                "iam:CreatePolicy",
                "iam:DeletePolicy",
                "iam:*PolicyVersion*",
                "iam:*InstanceProfile*",
            ],
            ["*"],
        )?,
        PolicyStatement::allow(["s3:Get*", "s3:List*", "s3:HeadBucket"], ["*"])?,
        PolicyStatement::allow(["cloudformation:*"], ["*"])?,
        PolicyStatement::allow(["apigateway:*"], ["*"])?,
        PolicyStatement::allow(["lambda:*"], ["*"])?,
        PolicyStatement::allow(["ssm:*"], ["*"])?,
    ];

    Role::new(RoleProps {
        logical_id: EXECUTION_ROLE_ID.to_string(),
        role_name: Some(EXECUTION_ROLE_NAME.to_string()),
        description: Some(
            "Role assumed by cloudformation service while creating the required resources"
                .to_string(),
        ),
        trust_statements: vec![PolicyStatement::trust(
            Principal::service(EXECUTION_SERVICE_PRINCIPAL),
            "sts:AssumeRole",
        )],
        inline_policies: vec![PolicyDocument::with_assigned_sids(
            EXECUTION_POLICY_NAME,
            statements,
        )?],
    })
}

/// Lets `principal` tag the sessions it opens on the role.
pub fn session_tagging_statement(principal: &Arn) -> PolicyStatement {
    PolicyStatement::trust(Principal::from(principal.clone()), "sts:TagSession")
}

/// The role the tools account assumes. Takes the execution role because
/// the pass-role grant is scoped to exactly that role's ARN.
pub fn declare_cross_account_role(
    config: &TargetAccountConfig,
    execution_role: &Role,
) -> Result<Role, DeclarationError> {
    let principal = config.trusted_principal();

    let statements = vec![
        PolicyStatement::allow(["sts:AssumeRole"], bootstrap_role_arns(config.environment()))?,
        PolicyStatement::allow(["iam:PassRole"], [execution_role.arn()])?,
        PolicyStatement::allow(["s3:List*"], ["*"])?,
        PolicyStatement::allow(["s3:*"], STAGING_BUCKET_RESOURCES)?,
        PolicyStatement::allow(["cloudformation:*"], ["*"])?,
        PolicyStatement::allow(["ssm:*"], ["*"])?,
    ];

    Role::new(RoleProps {
        logical_id: CROSS_ACCOUNT_ROLE_ID.to_string(),
        role_name: Some(CROSS_ACCOUNT_ROLE_NAME.to_string()),
        description: Some(
            "Cross account role to be assumed by the tools account. Used for CICD deployments only."
                .to_string(),
        ),
        trust_statements: vec![
            PolicyStatement::trust(Principal::from(principal.clone()), "sts:AssumeRole"),
            session_tagging_statement(principal),
        ],
        inline_policies: vec![PolicyDocument::with_assigned_sids(
            CROSS_ACCOUNT_POLICY_NAME,
            statements,
        )?],
    })
}

/// Build the complete target-account stack.
pub fn build_target_account_stack(config: &TargetAccountConfig) -> Result<Stack, DeclarationError> {
    let mut stack = StackBuilder::new(config.stack_name(), config.environment().clone())?
        .with_description(STACK_DESCRIPTION);

    let execution_role = declare_execution_role()?;
    let cross_account_role = declare_cross_account_role(config, &execution_role)?;
    let execution_role_arn = execution_role.arn();
    let cross_account_role_arn = cross_account_role.arn();

    stack.add_resource(execution_role)?;
    stack.add_resource(cross_account_role)?;

    stack.add_output(
        Output::new(EXECUTION_ROLE_OUTPUT, execution_role_arn)
            .with_description("Cloudformation Execution Role ARN")
            .with_export_name(EXECUTION_ROLE_EXPORT),
    )?;
    stack.add_output(
        Output::new(CROSS_ACCOUNT_ROLE_OUTPUT, cross_account_role_arn)
            .with_description("Cross Account Role ARN")
            .with_export_name(CROSS_ACCOUNT_ROLE_EXPORT),
    )?;

    info!(
        event = "Synth",
        phase = "TargetAccount",
        environment = config.environment().to_string(),
        trusted_principal = config.trusted_principal().as_str()
    );

    Ok(stack.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Effect, StringValue};
    use yare::parameterized;

    const TOOLS_USER: &str = "arn:aws:iam::222222222222:user/git-action-deployment-user";

    fn config() -> TargetAccountConfig {
        let env = StackEnvironment::new("111111111111", "us-east-1").unwrap();
        TargetAccountConfig::new(env, Some(TOOLS_USER)).unwrap()
    }

    #[test]
    fn test_execution_role_has_six_allow_statements() {
        let role = declare_execution_role().unwrap();
        let doc = role.inline_policy(EXECUTION_POLICY_NAME).unwrap();
        assert_eq!(doc.len(), 6);
        for statement in doc.statements() {
            assert_eq!(statement.effect(), Effect::Allow);
            assert!(!statement.actions().is_empty());
            assert_eq!(statement.resources(), &[StringValue::literal("*")]);
        }
    }

    #[test]
    fn test_execution_role_trusts_only_cloudformation() {
        let role = declare_execution_role().unwrap();
        let trust = role.assume_role_policy().statements();
        assert_eq!(trust.len(), 1);
        assert_eq!(
            trust[0].principals(),
            &[Principal::service("cloudformation.amazonaws.com")]
        );
        assert_eq!(trust[0].actions(), &["sts:AssumeRole".to_string()]);
    }

    #[test]
    fn test_pass_role_is_scoped_to_execution_role() {
        let execution_role = declare_execution_role().unwrap();
        let role = declare_cross_account_role(&config(), &execution_role).unwrap();
        let doc = role.inline_policy(CROSS_ACCOUNT_POLICY_NAME).unwrap();
        let pass_role = doc
            .statements()
            .iter()
            .find(|s| s.actions() == ["iam:PassRole".to_string()])
            .unwrap();
        assert_eq!(pass_role.resources(), &[execution_role.arn()]);
    }

    #[test]
    fn test_cross_account_trust_includes_session_tagging() {
        let execution_role = declare_execution_role().unwrap();
        let role = declare_cross_account_role(&config(), &execution_role).unwrap();
        let trust = role.assume_role_policy().statements();
        let actions: Vec<&str> = trust.iter().map(|s| s.actions()[0].as_str()).collect();
        assert_eq!(actions, vec!["sts:AssumeRole", "sts:TagSession"]);
        for statement in trust {
            assert_eq!(statement.principals()[0].identifier(), TOOLS_USER);
        }
    }

    #[test]
    fn test_staging_bucket_statement() {
        let execution_role = declare_execution_role().unwrap();
        let role = declare_cross_account_role(&config(), &execution_role).unwrap();
        let doc = role.inline_policy(CROSS_ACCOUNT_POLICY_NAME).unwrap();
        let s3 = doc.statement("3").unwrap();
        assert_eq!(s3.actions(), &["s3:*".to_string()]);
        assert_eq!(
            s3.resources(),
            &[
                StringValue::literal("arn:aws:s3:::cdktoolkit-stagingbucket-*"),
                StringValue::literal("arn:aws:s3:::cdktoolkit-stagingbucket-*/*"),
            ]
        );
    }

    #[parameterized(
        absent = { None },
        empty = { Some("") },
        blank = { Some("   ") },
        undefined_text = { Some("undefined") },
    )]
    fn test_missing_trusted_principal_is_an_error(input: Option<&str>) {
        let env = StackEnvironment::new("111111111111", "us-east-1").unwrap();
        let err = TargetAccountConfig::new(env, input).unwrap_err();
        assert!(matches!(err, DeclarationError::MissingField(f) if f == "trusted_principal_arn"));
    }

    #[parameterized(
        not_an_arn = { "git-action-deployment-user" },
        s3_arn = { "arn:aws:s3:::bucket" },
    )]
    fn test_malformed_trusted_principal_is_an_error(input: &str) {
        let env = StackEnvironment::new("111111111111", "us-east-1").unwrap();
        let err = TargetAccountConfig::new(env, Some(input)).unwrap_err();
        assert!(matches!(err, DeclarationError::InvalidArn { .. }));
    }

    #[test]
    fn test_stack_outputs() {
        let stack = build_target_account_stack(&config()).unwrap();
        assert_eq!(stack.name(), DEFAULT_STACK_NAME);
        assert_eq!(
            stack.export_names(),
            vec![EXECUTION_ROLE_EXPORT, CROSS_ACCOUNT_ROLE_EXPORT]
        );
        assert_eq!(
            stack.output(CROSS_ACCOUNT_ROLE_OUTPUT).unwrap().value(),
            &StringValue::get_att(CROSS_ACCOUNT_ROLE_ID, "Arn")
        );
    }

    #[test]
    fn test_custom_stack_name() {
        let stack = build_target_account_stack(&config().with_stack_name("dev-roles")).unwrap();
        assert_eq!(stack.name(), "dev-roles");
    }
}
