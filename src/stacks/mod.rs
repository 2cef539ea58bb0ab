//! The two stacks of the cross-account deployment setup.
//!
//! `target_account` is deployed once per environment (dev, staging, prod);
//! `tools_account` is deployed once into the account the CI runner uses.

pub mod target_account;
pub mod tools_account;
