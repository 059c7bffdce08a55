use crate::core::error::StoreError;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Number of nameserver slots an account carries
pub const NAMESERVER_SLOTS: usize = 4;

/// One account as returned by the store's JSON listing
///
/// The listing keys records by username and uses uppercase field names.
/// Non-admin listings omit the package, template and shell fields.
#[derive(Debug, Deserialize)]
struct RawAccount {
    #[serde(rename = "CONTACT")]
    contact: String,
    #[serde(rename = "PACKAGE", default)]
    package: Option<String>,
    #[serde(rename = "TEMPLATE", default)]
    template: Option<String>,
    #[serde(rename = "LANGUAGE", default)]
    language: String,
    #[serde(rename = "SHELL", default)]
    shell: Option<String>,
    #[serde(rename = "FNAME", default)]
    fname: String,
    #[serde(rename = "LNAME", default)]
    lname: String,
    #[serde(rename = "NS", default)]
    ns: String,
    #[serde(rename = "SUSPENDED", default)]
    suspended: String,
    #[serde(rename = "TIME", default)]
    time: String,
    #[serde(rename = "DATE", default)]
    date: String,
}

/// Immutable account state, fetched fresh from the store per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub username: String,
    pub contact: String,
    pub package: Option<String>,
    pub template: Option<String>,
    pub language: String,
    pub shell: Option<String>,
    pub fname: String,
    pub lname: String,
    pub nameservers: Nameservers,
    pub suspended: bool,
    pub time: String,
    pub date: String,
}

impl AccountSnapshot {
    fn from_raw(username: String, raw: RawAccount) -> Self {
        Self {
            username,
            contact: raw.contact,
            package: raw.package,
            template: raw.template,
            language: raw.language,
            shell: raw.shell,
            fname: raw.fname,
            lname: raw.lname,
            nameservers: Nameservers::parse(&raw.ns),
            suspended: raw.suspended == "yes",
            time: raw.time,
            date: raw.date,
        }
    }

    /// Status string for the render model
    pub fn status(&self) -> &'static str {
        if self.suspended {
            "suspended"
        } else {
            "active"
        }
    }

    /// Decode a single-account listing, keyed by username
    pub fn decode_listing(username: &str, json: &str) -> Result<Self, StoreError> {
        let mut accounts: BTreeMap<String, RawAccount> = serde_json::from_str(json)
            .map_err(|e| StoreError::BadOutput(e.to_string()))?;

        let raw = accounts.remove(username).ok_or_else(|| {
            StoreError::BadOutput(format!("user '{}' missing from listing", username))
        })?;

        Ok(Self::from_raw(username.to_string(), raw))
    }

    /// Decode a multi-account listing, ordered by username
    pub fn decode_all(json: &str) -> Result<Vec<Self>, StoreError> {
        let accounts: BTreeMap<String, RawAccount> = serde_json::from_str(json)
            .map_err(|e| StoreError::BadOutput(e.to_string()))?;

        Ok(accounts
            .into_iter()
            .map(|(username, raw)| Self::from_raw(username, raw))
            .collect())
    }
}

/// Fixed 4-slot nameserver list; trailing slots may be empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nameservers([String; NAMESERVER_SLOTS]);

impl Nameservers {
    /// Parse the store's comma-joined NS string ("ns1.x.com, ns2.x.com")
    pub fn parse(ns: &str) -> Self {
        let mut slots: [String; NAMESERVER_SLOTS] = Default::default();

        for (i, host) in ns.split(", ").take(NAMESERVER_SLOTS).enumerate() {
            slots[i] = host.trim().to_string();
        }

        Self(slots)
    }

    pub fn from_slots(slots: [String; NAMESERVER_SLOTS]) -> Self {
        Self(slots)
    }

    pub fn slot(&self, index: usize) -> &str {
        &self.0[index]
    }
}
