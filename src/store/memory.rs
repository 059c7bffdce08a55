//! In-memory account store for tests: applies mutations to stored
//! snapshots, records every issued call, and can be scripted to fail
//! specific verbs the way the CLI would.

use crate::core::error::StoreError;
use crate::models::account::{AccountSnapshot, Nameservers, NAMESERVER_SLOTS};
use crate::store::AccountStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Mutex;

pub struct InMemoryAccountStore {
    accounts: DashMap<String, AccountSnapshot>,
    failures: DashMap<String, (i32, String)>,
    calls: Mutex<Vec<String>>,
    languages: Vec<String>,
    packages: Vec<String>,
    templates: Vec<String>,
    shells: Vec<String>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            failures: DashMap::new(),
            calls: Mutex::new(Vec::new()),
            languages: vec!["en".to_string(), "de".to_string()],
            packages: vec!["default".to_string(), "premium".to_string()],
            templates: vec!["hosting".to_string()],
            shells: vec!["bash".to_string(), "nologin".to_string()],
        }
    }

    pub fn insert(&self, snapshot: AccountSnapshot) {
        self.accounts.insert(snapshot.username.clone(), snapshot);
    }

    /// Script the named verb to fail with the given exit status and message
    pub fn fail_verb(&self, verb: &str, status: i32, message: &str) {
        self.failures
            .insert(verb.to_string(), (status, message.to_string()));
    }

    pub fn clear_failure(&self, verb: &str) {
        self.failures.remove(verb);
    }

    /// Every mutation call issued so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn snapshot(&self, username: &str) -> Option<AccountSnapshot> {
        self.accounts.get(username).map(|entry| entry.clone())
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn scripted_failure(&self, verb: &str) -> Option<StoreError> {
        self.failures.get(verb).map(|entry| {
            let (status, message) = entry.value().clone();
            StoreError::Command { status, message }
        })
    }

    fn mutate<F>(&self, verb: &str, username: &str, call: String, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut AccountSnapshot),
    {
        self.record(call);

        if let Some(err) = self.scripted_failure(verb) {
            return Err(err);
        }

        let mut entry = self.accounts.get_mut(username).ok_or(StoreError::Command {
            status: 3,
            message: format!("Error: user {} doesn't exist", username),
        })?;

        apply(entry.value_mut());
        Ok(())
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn query(&self, username: &str) -> Result<AccountSnapshot, StoreError> {
        if let Some(err) = self.scripted_failure("query") {
            return Err(err);
        }

        self.accounts
            .get(username)
            .map(|entry| entry.clone())
            .ok_or(StoreError::Command {
                status: 3,
                message: format!("Error: user {} doesn't exist", username),
            })
    }

    async fn list_users(&self) -> Result<Vec<AccountSnapshot>, StoreError> {
        if let Some(err) = self.scripted_failure("list_users") {
            return Err(err);
        }

        let mut users: Vec<AccountSnapshot> =
            self.accounts.iter().map(|entry| entry.clone()).collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn set_password(&self, username: &str, password: &str) -> Result<(), StoreError> {
        // The real password never lands in a snapshot
        self.mutate(
            "set_password",
            username,
            format!("set_password {} {}", username, password),
            |_| {},
        )
    }

    async fn set_package(&self, username: &str, package: &str) -> Result<(), StoreError> {
        self.mutate(
            "set_package",
            username,
            format!("set_package {} {}", username, package),
            |account| account.package = Some(package.to_string()),
        )
    }

    async fn set_language(&self, username: &str, language: &str) -> Result<(), StoreError> {
        self.mutate(
            "set_language",
            username,
            format!("set_language {} {}", username, language),
            |account| account.language = language.to_string(),
        )
    }

    async fn set_template(&self, username: &str, template: &str) -> Result<(), StoreError> {
        self.mutate(
            "set_template",
            username,
            format!("set_template {} {}", username, template),
            |account| account.template = Some(template.to_string()),
        )
    }

    async fn set_shell(&self, username: &str, shell: &str) -> Result<(), StoreError> {
        self.mutate(
            "set_shell",
            username,
            format!("set_shell {} {}", username, shell),
            |account| account.shell = Some(shell.to_string()),
        )
    }

    async fn set_contact(&self, username: &str, email: &str) -> Result<(), StoreError> {
        self.mutate(
            "set_contact",
            username,
            format!("set_contact {} {}", username, email),
            |account| account.contact = email.to_string(),
        )
    }

    async fn set_name(
        &self,
        username: &str,
        fname: &str,
        lname: &str,
    ) -> Result<(), StoreError> {
        self.mutate(
            "set_name",
            username,
            format!("set_name {} {} {}", username, fname, lname),
            |account| {
                account.fname = fname.to_string();
                account.lname = lname.to_string();
            },
        )
    }

    async fn set_nameservers(
        &self,
        username: &str,
        nameservers: &[String],
    ) -> Result<(), StoreError> {
        let call = format!("set_nameservers {} {}", username, nameservers.join(" "));

        self.mutate("set_nameservers", username, call, |account| {
            let mut slots: [String; NAMESERVER_SLOTS] = Default::default();
            for (i, ns) in nameservers.iter().take(NAMESERVER_SLOTS).enumerate() {
                slots[i] = ns.clone();
            }
            account.nameservers = Nameservers::from_slots(slots);
        })
    }

    async fn list_packages(&self) -> Result<Vec<String>, StoreError> {
        if let Some(err) = self.scripted_failure("list_packages") {
            return Err(err);
        }
        Ok(self.packages.clone())
    }

    async fn list_templates(&self) -> Result<Vec<String>, StoreError> {
        if let Some(err) = self.scripted_failure("list_templates") {
            return Err(err);
        }
        Ok(self.templates.clone())
    }

    async fn list_shells(&self) -> Result<Vec<String>, StoreError> {
        if let Some(err) = self.scripted_failure("list_shells") {
            return Err(err);
        }
        Ok(self.shells.clone())
    }

    async fn list_languages(&self) -> Result<Vec<String>, StoreError> {
        if let Some(err) = self.scripted_failure("list_languages") {
            return Err(err);
        }
        Ok(self.languages.clone())
    }
}

/// Baseline snapshot used across reconciler and handler tests
pub fn test_snapshot(username: &str) -> AccountSnapshot {
    AccountSnapshot {
        username: username.to_string(),
        contact: format!("{}@example.com", username),
        package: Some("default".to_string()),
        template: Some("hosting".to_string()),
        language: "en".to_string(),
        shell: Some("bash".to_string()),
        fname: "First".to_string(),
        lname: "Last".to_string(),
        nameservers: Nameservers::parse("ns1.example.com, ns2.example.com"),
        suspended: false,
        time: "10:00:00".to_string(),
        date: "2026-01-15".to_string(),
    }
}
