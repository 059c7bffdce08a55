pub mod cli;
#[cfg(test)]
pub mod memory;

use crate::core::error::StoreError;
use crate::models::account::AccountSnapshot;
use async_trait::async_trait;

/// The privileged account subsystem, one verb per mutable field
///
/// The production backend shells out to the v-* toolset; tests inject an
/// in-memory fake. Every mutation is an externally visible write; the store
/// itself serializes concurrent changes to the same account.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fetch a fresh snapshot of one account
    async fn query(&self, username: &str) -> Result<AccountSnapshot, StoreError>;

    /// Fetch snapshots of all accounts, ordered by username
    async fn list_users(&self) -> Result<Vec<AccountSnapshot>, StoreError>;

    async fn set_password(&self, username: &str, password: &str) -> Result<(), StoreError>;

    async fn set_package(&self, username: &str, package: &str) -> Result<(), StoreError>;

    async fn set_language(&self, username: &str, language: &str) -> Result<(), StoreError>;

    async fn set_template(&self, username: &str, template: &str) -> Result<(), StoreError>;

    async fn set_shell(&self, username: &str, shell: &str) -> Result<(), StoreError>;

    async fn set_contact(&self, username: &str, email: &str) -> Result<(), StoreError>;

    async fn set_name(&self, username: &str, fname: &str, lname: &str)
        -> Result<(), StoreError>;

    /// Takes 2 to 4 hostnames; empty trailing slots are never passed
    async fn set_nameservers(
        &self,
        username: &str,
        nameservers: &[String],
    ) -> Result<(), StoreError>;

    async fn list_packages(&self) -> Result<Vec<String>, StoreError>;

    async fn list_templates(&self) -> Result<Vec<String>, StoreError>;

    async fn list_shells(&self) -> Result<Vec<String>, StoreError>;

    async fn list_languages(&self) -> Result<Vec<String>, StoreError>;
}
