//! Declarative records for IAM and secret resources.
//!
//! Every type here is immutable once built. Constructors validate their
//! invariants (non-empty actions and resources, unique statement ids) and
//! return `DeclarationError` instead of producing a half-valid record.
//!
//! Rendering follows the CloudFormation template format:
//! - single-entry `Action` / `Resource` lists render as a bare string
//! - references to other resources render as `Ref` / `Fn::GetAtt`
//! - policy documents always carry `Version: "2012-10-17"`

mod arn;
mod credentials;
mod document;
mod output;
mod principal;
mod resource;
mod resource_type;
mod role;
mod statement;
mod user;
mod value;

pub use arn::Arn;
pub use credentials::{AccessKey, Secret};
pub use document::{POLICY_VERSION, PolicyDocument};
pub use output::Output;
pub use principal::Principal;
pub use resource::Resource;
pub use resource_type::{Effect, ResourceType};
pub use role::{Role, RoleProps, TRUST_POLICY_NAME};
pub use statement::PolicyStatement;
pub use user::{InlinePolicy, User};
pub use value::StringValue;
