use crate::models::account::AccountSnapshot;
use serde::{Deserialize, Serialize};

/// Placeholder shown in place of the real password
///
/// The stored password is never read back; a password change is detected by
/// the submitted value differing from this sentinel.
pub const MASKED_PASSWORD: &str = "\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}";

/// Submitted edit form; untrusted input
#[derive(Debug, Clone, Deserialize)]
pub struct EditUserForm {
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub shell: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub fname: String,
    #[serde(default)]
    pub lname: String,
    #[serde(default)]
    pub ns1: String,
    #[serde(default)]
    pub ns2: String,
    #[serde(default)]
    pub ns3: String,
    #[serde(default)]
    pub ns4: String,
}

impl EditUserForm {
    pub fn nameserver_slots(&self) -> [&str; 4] {
        [&self.ns1, &self.ns2, &self.ns3, &self.ns4]
    }
}

/// Account render model for the edit form; the password is always masked
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountView {
    pub username: String,
    pub password: String,
    pub email: String,
    pub package: Option<String>,
    pub template: Option<String>,
    pub language: String,
    pub shell: Option<String>,
    pub fname: String,
    pub lname: String,
    pub ns1: String,
    pub ns2: String,
    pub ns3: String,
    pub ns4: String,
    pub status: String,
    pub time: String,
    pub date: String,
}

impl From<&AccountSnapshot> for AccountView {
    fn from(snapshot: &AccountSnapshot) -> Self {
        Self {
            username: snapshot.username.clone(),
            password: MASKED_PASSWORD.to_string(),
            email: snapshot.contact.clone(),
            package: snapshot.package.clone(),
            template: snapshot.template.clone(),
            language: snapshot.language.clone(),
            shell: snapshot.shell.clone(),
            fname: snapshot.fname.clone(),
            lname: snapshot.lname.clone(),
            ns1: snapshot.nameservers.slot(0).to_string(),
            ns2: snapshot.nameservers.slot(1).to_string(),
            ns3: snapshot.nameservers.slot(2).to_string(),
            ns4: snapshot.nameservers.slot(3).to_string(),
            status: snapshot.status().to_string(),
            time: snapshot.time.clone(),
            date: snapshot.date.clone(),
        }
    }
}
