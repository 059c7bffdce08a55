use crate::core::error::StoreError;
use crate::models::account::AccountSnapshot;
use crate::store::AccountStore;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

// Store CLI command names, one verb per mutable field
const CMD_LIST_USER: &str = "v-list-user";
const CMD_LIST_USERS: &str = "v-list-users";
const CMD_CHANGE_PASSWORD: &str = "v-change-user-password";
const CMD_CHANGE_PACKAGE: &str = "v-change-user-package";
const CMD_CHANGE_LANGUAGE: &str = "v-change-user-language";
const CMD_CHANGE_TEMPLATE: &str = "v-change-user-template";
const CMD_CHANGE_SHELL: &str = "v-change-user-shell";
const CMD_CHANGE_CONTACT: &str = "v-change-user-contact";
const CMD_CHANGE_NAME: &str = "v-change-user-name";
const CMD_CHANGE_NS: &str = "v-change-user-ns";
const CMD_LIST_PACKAGES: &str = "v-list-user-packages";
const CMD_LIST_TEMPLATES: &str = "v-list-web-templates";
const CMD_LIST_SHELLS: &str = "v-list-sys-shells";
const CMD_LIST_LANGUAGES: &str = "v-list-sys-languages";

/// Account store backed by the privileged v-* command-line toolset
///
/// Arguments are passed as an argv vector, never through a shell, so
/// untrusted field values cannot break out of their argument position.
/// Every call runs under a timeout; expiry kills the child and surfaces
/// as a store failure.
pub struct CliAccountStore {
    bin_dir: PathBuf,
    timeout: Duration,
}

impl CliAccountStore {
    pub fn new(bin_dir: PathBuf, timeout: Duration) -> Self {
        Self { bin_dir, timeout }
    }

    /// Whether the toolset looks present at the configured location
    pub fn probe(&self) -> bool {
        self.bin_dir.join(CMD_LIST_USER).exists()
    }

    /// Run one store command, returning its stdout lines on success
    async fn run(&self, command: &str, args: &[&str]) -> Result<Vec<String>, StoreError> {
        let path = self.bin_dir.join(command);

        debug!(command = command, args = ?args, "Invoking account store");

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&path)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| StoreError::Timeout)??;

        let mut lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|line| line.to_string())
            .collect();

        if output.status.success() {
            return Ok(lines);
        }

        // Diagnostics go to stdout in the v-* toolset, but collect stderr too
        lines.extend(
            String::from_utf8_lossy(&output.stderr)
                .lines()
                .map(|line| line.to_string()),
        );

        Err(StoreError::from_exit(output.status.code().unwrap_or(-1), &lines))
    }

    async fn run_json(&self, command: &str, args: &[&str]) -> Result<String, StoreError> {
        let lines = self.run(command, args).await?;
        Ok(lines.concat())
    }
}

/// Decode a catalog listing: either a JSON array of names or an object
/// keyed by name
fn decode_names(json: &str) -> Result<Vec<String>, StoreError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| StoreError::BadOutput(e.to_string()))?;

    match value {
        Value::Array(items) => Ok(items
            .iter()
            .filter_map(|item| item.as_str())
            .map(|name| name.to_string())
            .collect()),
        Value::Object(map) => Ok(map.keys().cloned().collect()),
        _ => Err(StoreError::BadOutput(
            "expected a JSON array or object".to_string(),
        )),
    }
}

#[async_trait]
impl AccountStore for CliAccountStore {
    async fn query(&self, username: &str) -> Result<AccountSnapshot, StoreError> {
        let json = self.run_json(CMD_LIST_USER, &[username, "json"]).await?;
        AccountSnapshot::decode_listing(username, &json)
    }

    async fn list_users(&self) -> Result<Vec<AccountSnapshot>, StoreError> {
        let json = self.run_json(CMD_LIST_USERS, &["json"]).await?;
        AccountSnapshot::decode_all(&json)
    }

    async fn set_password(&self, username: &str, password: &str) -> Result<(), StoreError> {
        self.run(CMD_CHANGE_PASSWORD, &[username, password]).await?;
        Ok(())
    }

    async fn set_package(&self, username: &str, package: &str) -> Result<(), StoreError> {
        self.run(CMD_CHANGE_PACKAGE, &[username, package]).await?;
        Ok(())
    }

    async fn set_language(&self, username: &str, language: &str) -> Result<(), StoreError> {
        self.run(CMD_CHANGE_LANGUAGE, &[username, language]).await?;
        Ok(())
    }

    async fn set_template(&self, username: &str, template: &str) -> Result<(), StoreError> {
        self.run(CMD_CHANGE_TEMPLATE, &[username, template]).await?;
        Ok(())
    }

    async fn set_shell(&self, username: &str, shell: &str) -> Result<(), StoreError> {
        self.run(CMD_CHANGE_SHELL, &[username, shell]).await?;
        Ok(())
    }

    async fn set_contact(&self, username: &str, email: &str) -> Result<(), StoreError> {
        self.run(CMD_CHANGE_CONTACT, &[username, email]).await?;
        Ok(())
    }

    async fn set_name(
        &self,
        username: &str,
        fname: &str,
        lname: &str,
    ) -> Result<(), StoreError> {
        self.run(CMD_CHANGE_NAME, &[username, fname, lname]).await?;
        Ok(())
    }

    async fn set_nameservers(
        &self,
        username: &str,
        nameservers: &[String],
    ) -> Result<(), StoreError> {
        let mut args = vec![username];
        args.extend(nameservers.iter().map(|ns| ns.as_str()));

        self.run(CMD_CHANGE_NS, &args).await?;
        Ok(())
    }

    async fn list_packages(&self) -> Result<Vec<String>, StoreError> {
        let json = self.run_json(CMD_LIST_PACKAGES, &["json"]).await?;
        decode_names(&json)
    }

    async fn list_templates(&self) -> Result<Vec<String>, StoreError> {
        let json = self.run_json(CMD_LIST_TEMPLATES, &["json"]).await?;
        decode_names(&json)
    }

    async fn list_shells(&self) -> Result<Vec<String>, StoreError> {
        let json = self.run_json(CMD_LIST_SHELLS, &["json"]).await?;
        decode_names(&json)
    }

    async fn list_languages(&self) -> Result<Vec<String>, StoreError> {
        let json = self.run_json(CMD_LIST_LANGUAGES, &["json"]).await?;
        decode_names(&json)
    }
}
