use crate::models::account::{AccountSnapshot, NAMESERVER_SLOTS};
use crate::models::form::{EditUserForm, MASKED_PASSWORD};

/// One mutable account field, in checklist order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Password,
    Package,
    Language,
    Template,
    Shell,
    Contact,
    Name,
    Nameservers,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Password => "password",
            Field::Package => "package",
            Field::Language => "language",
            Field::Template => "template",
            Field::Shell => "shell",
            Field::Contact => "contact",
            Field::Name => "name",
            Field::Nameservers => "nameservers",
        }
    }
}

/// Typed diff between the current snapshot and a submitted form, computed
/// once up front. A `Some` field holds the value to write to the store.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    pub password: Option<String>,
    pub package: Option<String>,
    pub language: Option<String>,
    pub template: Option<String>,
    pub shell: Option<String>,
    pub contact: Option<String>,
    /// First and last name travel as one unit; either differing marks both
    pub name: Option<(String, String)>,
    /// Ready-to-send argument vector: first two slots always present,
    /// empty trailing slots elided
    pub nameservers: Option<Vec<String>>,
}

impl ChangeSet {
    pub fn compute(current: &AccountSnapshot, form: &EditUserForm, is_admin: bool) -> Self {
        let mut changes = Self::default();

        // The password is compared against the masked sentinel, never a
        // stored value
        if form.password != MASKED_PASSWORD {
            changes.password = Some(form.password.clone());
        }

        if is_admin && current.package.as_deref().unwrap_or("") != form.package {
            changes.package = Some(form.package.clone());
        }

        if current.language != form.language {
            changes.language = Some(form.language.clone());
        }

        if is_admin && current.template.as_deref().unwrap_or("") != form.template {
            changes.template = Some(form.template.clone());
        }

        if is_admin && current.shell.as_deref().unwrap_or("") != form.shell {
            changes.shell = Some(form.shell.clone());
        }

        if current.contact != form.email {
            changes.contact = Some(form.email.clone());
        }

        if current.fname != form.fname || current.lname != form.lname {
            changes.name = Some((form.fname.clone(), form.lname.clone()));
        }

        let submitted = form.nameserver_slots();
        let differs = (0..NAMESERVER_SLOTS).any(|i| current.nameservers.slot(i) != submitted[i]);
        if differs {
            let mut args = vec![form.ns1.clone(), form.ns2.clone()];
            if !form.ns3.is_empty() {
                args.push(form.ns3.clone());
            }
            if !form.ns4.is_empty() {
                args.push(form.ns4.clone());
            }
            changes.nameservers = Some(args);
        }

        changes
    }

    pub fn is_empty(&self) -> bool {
        self.password.is_none()
            && self.package.is_none()
            && self.language.is_none()
            && self.template.is_none()
            && self.shell.is_none()
            && self.contact.is_none()
            && self.name.is_none()
            && self.nameservers.is_none()
    }
}
