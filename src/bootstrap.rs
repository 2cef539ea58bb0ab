//! Names of the resources the provisioning engine's bootstrap stack creates
//! in every account and region. This crate only refers to them.

use itertools::Itertools;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::environment::StackEnvironment;

/// Default bootstrap qualifier.
pub const QUALIFIER: &str = "hnb659fds";

/// Staging bucket created by the bootstrap stack, and the objects in it.
pub const STAGING_BUCKET_RESOURCES: [&str; 2] = [
    "arn:aws:s3:::cdktoolkit-stagingbucket-*",
    "arn:aws:s3:::cdktoolkit-stagingbucket-*/*",
];

/// The per-account, per-region roles the bootstrap stack creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum BootstrapRole {
    CfnExecRole,
    DeployRole,
    FilePublishingRole,
    ImagePublishingRole,
    LookupRole,
}

impl BootstrapRole {
    /// `arn:aws:iam::<account>:role/cdk-<qualifier>-<suffix>-<account>-<region>`
    pub fn arn(&self, env: &StackEnvironment) -> String {
        format!(
            "arn:aws:iam::{account}:role/cdk-{QUALIFIER}-{suffix}-{account}-{region}",
            account = env.account(),
            suffix = self.as_ref(),
            region = env.region(),
        )
    }
}

/// ARNs of all bootstrap roles for `env`, in declaration order.
pub fn bootstrap_role_arns(env: &StackEnvironment) -> Vec<String> {
    BootstrapRole::iter().map(|role| role.arn(env)).collect_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn env() -> StackEnvironment {
        StackEnvironment::new("111111111111", "us-east-1").unwrap()
    }

    #[parameterized(
        cfn_exec = { BootstrapRole::CfnExecRole, "cfn-exec-role" },
        deploy = { BootstrapRole::DeployRole, "deploy-role" },
        file_publishing = { BootstrapRole::FilePublishingRole, "file-publishing-role" },
        image_publishing = { BootstrapRole::ImagePublishingRole, "image-publishing-role" },
        lookup = { BootstrapRole::LookupRole, "lookup-role" },
    )]
    fn test_suffix_and_arn(role: BootstrapRole, suffix: &str) {
        assert_eq!(role.as_ref(), suffix);
        assert_eq!(
            role.arn(&env()),
            format!("arn:aws:iam::111111111111:role/cdk-hnb659fds-{suffix}-111111111111-us-east-1")
        );
    }

    #[parameterized(
        us_east = { "123456789012", "us-east-1" },
        eu_west = { "000000000001", "eu-west-3" },
        gov = { "999999999999", "us-gov-east-1" },
    )]
    fn test_arns_follow_template_for_any_environment(account: &str, region: &str) {
        let env = StackEnvironment::new(account, region).unwrap();
        let arns = bootstrap_role_arns(&env);
        assert_eq!(arns.len(), 5);
        for (arn, role) in arns.iter().zip(BootstrapRole::iter()) {
            let expected = format!("arn:aws:iam::{account}:role/cdk-hnb659fds-{role}-{account}-{region}");
            assert_eq!(arn, &expected);
        }
    }

    #[test]
    fn test_cfn_exec_role_snapshot() {
        insta::assert_snapshot!(
            BootstrapRole::CfnExecRole.arn(&env()),
            @"arn:aws:iam::111111111111:role/cdk-hnb659fds-cfn-exec-role-111111111111-us-east-1"
        );
    }
}
