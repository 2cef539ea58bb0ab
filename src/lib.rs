// src/lib.rs
pub use assembly::{Manifest, ManifestEntry, write_assembly};
pub use bootstrap::{BootstrapRole, bootstrap_role_arns};
pub use environment::StackEnvironment;
pub use error::DeclarationError;
pub use loader::{CrossAccountParameters, DEFAULT_PARAMETER_FILE, load_parameters, parse_parameters};
pub use stack::{Stack, StackBuilder};
pub use stacks::target_account::{TargetAccountConfig, build_target_account_stack};
pub use stacks::tools_account::{ToolsAccountConfig, build_tools_account_stack};
pub use traits::CfnResource;

pub mod assembly;
pub mod bootstrap;
mod environment;
mod error;
mod loader;
pub mod stack;
pub mod stacks;
mod traits;
pub mod types;
