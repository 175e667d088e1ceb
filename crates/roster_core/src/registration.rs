//! Registration page: one persisted user and the page sections that depend on it.

use chrono::NaiveDate;
use shared::{
    domain::RegisteredUser,
    error::ValidationError,
    protocol::RegistrationForm,
};
use storage::{read_json, write_json, KeyValueStore, StorageError};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_REGISTRATION_KEY: &str = "registeredUser";
pub const ALREADY_REGISTERED_NOTICE: &str =
    "You are already registered. Please sign out if you want to register with a different account.";

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Which sections of the page are visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationView {
    pub greeting: Option<String>,
    pub show_signout: bool,
    pub show_form: bool,
    pub notice: Option<&'static str>,
}

impl RegistrationView {
    fn for_user(user: Option<&RegisteredUser>) -> Self {
        match user.filter(|user| user.is_registered()) {
            Some(user) => Self {
                greeting: Some(format!("Welcome, {}", user.first_name.trim())),
                show_signout: true,
                show_form: false,
                notice: Some(ALREADY_REGISTERED_NOTICE),
            },
            None => Self {
                greeting: None,
                show_signout: false,
                show_form: true,
                notice: None,
            },
        }
    }
}

pub struct RegistrationPage<S> {
    storage: S,
    key: String,
    user: Option<RegisteredUser>,
}

impl<S: KeyValueStore> RegistrationPage<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            key: DEFAULT_REGISTRATION_KEY.to_string(),
            user: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn user(&self) -> Option<&RegisteredUser> {
        self.user.as_ref()
    }

    pub fn view(&self) -> RegistrationView {
        RegistrationView::for_user(self.user.as_ref())
    }

    /// Reads the stored user. Unreadable JSON counts as "not registered".
    pub async fn load(&mut self) -> Result<RegistrationView, StorageError> {
        self.user = match read_json::<RegisteredUser, _>(&self.storage, &self.key).await {
            Ok(user) => user,
            Err(err) if err.is_parse() => {
                warn!(key = %self.key, error = %err, "registration: ignoring unreadable user");
                None
            }
            Err(err) => return Err(err),
        };
        Ok(self.view())
    }

    pub async fn submit(
        &mut self,
        form: &RegistrationForm,
    ) -> Result<RegistrationView, RegistrationError> {
        let user = validate_registration(form)?;
        write_json(&self.storage, &self.key, &user).await?;
        info!(key = %self.key, "registration: user stored");
        self.user = Some(user);
        Ok(self.view())
    }

    pub async fn sign_out(&mut self) -> Result<RegistrationView, StorageError> {
        self.storage.remove(&self.key).await?;
        self.user = None;
        info!(key = %self.key, "registration: signed out");
        Ok(self.view())
    }
}

pub fn validate_registration(form: &RegistrationForm) -> Result<RegisteredUser, ValidationError> {
    let first_name = form.first_name.trim();
    let last_name = form.last_name.trim();
    let email = form.email.trim();

    for (field, value) in [
        ("first_name", first_name),
        ("last_name", last_name),
        ("email", email),
    ] {
        if value.is_empty() {
            return Err(ValidationError::MissingField(field));
        }
    }

    let birth_date = match form.birth_date.trim() {
        "" => None,
        raw => Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| ValidationError::InvalidDate(raw.to_string()))?,
        ),
    };

    Ok(RegisteredUser {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        birth_date,
        interest: form.interest.trim().to_string(),
    })
}

#[cfg(test)]
#[path = "tests/registration_tests.rs"]
mod tests;
