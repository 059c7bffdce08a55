use crate::models::account::AccountSnapshot;
use crate::models::form::EditUserForm;
use crate::reconcile::changes::{ChangeSet, Field};
use crate::store::AccountStore;
use crate::validation::email::is_valid_email;
use tracing::{debug, info, warn};

pub const SAVED_MESSAGE: &str = "Changes have been saved.";
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";

/// Result of one reconciliation pass; exactly one per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Failed(String),
}

#[derive(Debug)]
pub struct ReconcileReport {
    pub outcome: Outcome,
    /// Fields whose mutation succeeded, in checklist order. Populated even
    /// when a later field failed; those writes are committed and stay.
    pub applied: Vec<Field>,
}

/// Compare submitted fields against the current snapshot and issue at most
/// one store mutation per changed field, in checklist order, stopping at
/// the first failure. No rollback: fields mutated before the failing one
/// remain changed in the store.
pub async fn reconcile(
    store: &dyn AccountStore,
    current: &AccountSnapshot,
    form: &EditUserForm,
    is_admin: bool,
) -> ReconcileReport {
    let changes = ChangeSet::compute(current, form, is_admin);
    let username = current.username.as_str();

    let mut applied = Vec::new();
    let mut failure: Option<String> = None;

    if changes.is_empty() {
        debug!(user = username, "No fields differ, nothing to reconcile");
        return ReconcileReport {
            outcome: Outcome::Applied,
            applied,
        };
    }

    if let Some(password) = &changes.password {
        apply(
            store.set_password(username, password).await,
            Field::Password,
            username,
            &mut applied,
            &mut failure,
        );
    }

    if failure.is_none() {
        if let Some(package) = &changes.package {
            apply(
                store.set_package(username, package).await,
                Field::Package,
                username,
                &mut applied,
                &mut failure,
            );
        }
    }

    if failure.is_none() {
        if let Some(language) = &changes.language {
            apply(
                store.set_language(username, language).await,
                Field::Language,
                username,
                &mut applied,
                &mut failure,
            );
        }
    }

    if failure.is_none() {
        if let Some(template) = &changes.template {
            apply(
                store.set_template(username, template).await,
                Field::Template,
                username,
                &mut applied,
                &mut failure,
            );
        }
    }

    if failure.is_none() {
        if let Some(shell) = &changes.shell {
            apply(
                store.set_shell(username, shell).await,
                Field::Shell,
                username,
                &mut applied,
                &mut failure,
            );
        }
    }

    if failure.is_none() {
        if let Some(email) = &changes.contact {
            // Malformed addresses never reach the store
            if !is_valid_email(email) {
                warn!(user = username, "Rejected malformed contact email");
                failure = Some(INVALID_EMAIL_MESSAGE.to_string());
            } else {
                apply(
                    store.set_contact(username, email).await,
                    Field::Contact,
                    username,
                    &mut applied,
                    &mut failure,
                );
            }
        }
    }

    if failure.is_none() {
        if let Some((fname, lname)) = &changes.name {
            apply(
                store.set_name(username, fname, lname).await,
                Field::Name,
                username,
                &mut applied,
                &mut failure,
            );
        }
    }

    if failure.is_none() {
        if let Some(nameservers) = &changes.nameservers {
            apply(
                store.set_nameservers(username, nameservers).await,
                Field::Nameservers,
                username,
                &mut applied,
                &mut failure,
            );
        }
    }

    let outcome = match failure {
        Some(message) => Outcome::Failed(message),
        None => Outcome::Applied,
    };

    ReconcileReport { outcome, applied }
}

fn apply(
    result: Result<(), crate::core::error::StoreError>,
    field: Field,
    username: &str,
    applied: &mut Vec<Field>,
    failure: &mut Option<String>,
) {
    match result {
        Ok(()) => {
            info!(user = username, field = field.name(), "Field updated");
            applied.push(field);
        }
        Err(e) => {
            warn!(
                user = username,
                field = field.name(),
                error = %e,
                "Field update failed, aborting checklist"
            );
            *failure = Some(e.to_string());
        }
    }
}
