//! The resources deployed into the tools account: the CI user, its right to
//! assume the cross-account roles, and a secret holding its access key.

use std::collections::BTreeMap;

use itertools::Itertools;
use tracing::{info, warn};

use crate::environment::StackEnvironment;
use crate::error::DeclarationError;
use crate::stack::{Stack, StackBuilder};
use crate::types::{
    AccessKey, Arn, InlinePolicy, Output, PolicyDocument, PolicyStatement, Secret, User,
};

pub const DEFAULT_STACK_NAME: &str = "cf-GitActionDeploymentUserStack";
pub const STACK_DESCRIPTION: &str =
    "Creates the CI deployment user and its cross account assume-role rights";

pub const USER_ID: &str = "GitActionDeploymentUser";
pub const USER_NAME: &str = "git-action-deployment-user";
pub const POLICY_ID: &str = "GitActionDeploymentUserPolicy";
pub const ASSUME_ROLE_SID: &str = "CrossAccountAssumeRole";
pub const SESSION_TAGGING_SID: &str = "STSSessionTagging";
pub const ACCESS_KEY_ID: &str = "GitActionDeploymentUserAccessKey";
pub const SECRET_ID: &str = "GitActionDeploymentUserSecret";
pub const SECRET_NAME: &str = "git-action-deployment-user-secret";

pub const USER_ARN_OUTPUT: &str = "OutGitActionDeploymentUserArn";
pub const USER_ARN_EXPORT: &str = "GIT-ACTIONS-DEPLOYMENT-USER-ARN";
pub const ACCESS_KEY_OUTPUT: &str = "OutGitActionDeploymentUserAccessKey";
pub const ACCESS_KEY_EXPORT: &str = "GIT-ACTIONS-DEPLOYMENT-USER-ACCESS-KEY";
pub const SECRET_ARN_OUTPUT: &str = "OutGitActionDeploymentUserSecretArn";
pub const SECRET_ARN_EXPORT: &str = "GIT-ACTIONS-DEPLOYMENT-USER-SECRET-ARN";

/// Inputs for the tools-account stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolsAccountConfig {
    environment: StackEnvironment,
    cross_account_roles: BTreeMap<String, Arn>,
    stack_name: String,
}

impl ToolsAccountConfig {
    /// `cross_account_role_arns` maps a deployment environment name
    /// (dev, staging, prod, ...) to the cross-account role ARN exported by
    /// that environment's target-account stack. Every value must be an IAM
    /// role ARN and the mapping must not be empty.
    pub fn new(
        environment: StackEnvironment,
        cross_account_role_arns: BTreeMap<String, String>,
    ) -> Result<Self, DeclarationError> {
        if cross_account_role_arns.is_empty() {
            return Err(DeclarationError::MissingField(
                "cross_account_role_arns".to_string(),
            ));
        }

        let cross_account_roles = cross_account_role_arns
            .into_iter()
            .map(|(env_name, arn)| -> Result<(String, Arn), DeclarationError> {
                Ok((env_name, Arn::parse_role(arn.trim())?))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(ToolsAccountConfig {
            environment,
            cross_account_roles,
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

    pub fn cross_account_roles(&self) -> &BTreeMap<String, Arn> {
        &self.cross_account_roles
    }

    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }
}

pub fn declare_deployment_user() -> Result<User, DeclarationError> {
    User::new(USER_ID, USER_NAME)
}

/// Grant `user` `sts:AssumeRole` on exactly the configured role ARNs (sorted,
/// duplicates collapsed) plus unrestricted `sts:TagSession`.
pub fn declare_assume_role_policy(
    config: &ToolsAccountConfig,
    user: &User,
) -> Result<InlinePolicy, DeclarationError> {
    let role_arns = config
        .cross_account_roles()
        .values()
        .map(|arn| arn.as_str().to_string())
        .sorted()
        .dedup()
        .collect_vec();

    if role_arns.len() < config.cross_account_roles().len() {
        warn!(
            event = "Declare",
            phase = "Policy",
            environments = config.cross_account_roles().len(),
            distinct_roles = role_arns.len(),
            "several environments share one cross-account role"
        );
    }

    let document = PolicyDocument::new(
        POLICY_ID,
        vec![
            PolicyStatement::allow(["sts:AssumeRole"], role_arns)?.with_sid(ASSUME_ROLE_SID),
            PolicyStatement::allow(["sts:TagSession"], ["*"])?.with_sid(SESSION_TAGGING_SID),
        ],
    )?;

    InlinePolicy::for_users(POLICY_ID, document, vec![user.name_ref()])
}

/// A long-lived key pair for `user`.
pub fn mint_access_key(user: &User) -> AccessKey {
    AccessKey::new(ACCESS_KEY_ID, user.name_ref())
}

/// A secret whose value is the key's secret half, resolved at apply time.
pub fn store_secret(access_key: &AccessKey) -> Result<Secret, DeclarationError> {
    Secret::new(
        SECRET_ID,
        SECRET_NAME,
        Some("Secret for the git action deployment user".to_string()),
        access_key.secret_access_key(),
    )
}

/// Build the complete tools-account stack.
pub fn build_tools_account_stack(config: &ToolsAccountConfig) -> Result<Stack, DeclarationError> {
    let mut stack = StackBuilder::new(config.stack_name(), config.environment().clone())?
        .with_description(STACK_DESCRIPTION);

    let user = declare_deployment_user()?;
    let policy = declare_assume_role_policy(config, &user)?;
    let access_key = mint_access_key(&user);
    let secret = store_secret(&access_key)?;

    let user_arn = user.arn();
    let access_key_id = access_key.access_key_id();
    let secret_arn = secret.secret_arn();

    stack.add_resource(user)?;
    stack.add_resource(policy)?;
    stack.add_resource(access_key)?;
    stack.add_resource(secret)?;

    stack.add_output(
        Output::new(USER_ARN_OUTPUT, user_arn)
            .with_description("Git action deployment user arn")
            .with_export_name(USER_ARN_EXPORT),
    )?;
    stack.add_output(
        Output::new(ACCESS_KEY_OUTPUT, access_key_id)
            .with_description("Access key for git action deployment user")
            .with_export_name(ACCESS_KEY_EXPORT),
    )?;
    stack.add_output(
        Output::new(SECRET_ARN_OUTPUT, secret_arn)
            .with_description("User secret for git action deployment user")
            .with_export_name(SECRET_ARN_EXPORT),
    )?;

    info!(
        event = "Synth",
        phase = "ToolsAccount",
        environment = config.environment().to_string(),
        environments = config.cross_account_roles().keys().join(",")
    );

    Ok(stack.build())
}
