//! Roster page controller: turns page events into store calls and view updates.
//!
//! Handlers never fail; every outcome, including rejected input and storage
//! trouble, is reported through the returned [`ViewUpdate`].

use shared::{
    domain::{SortKey, Student},
    error::{ErrorCode, RosterError, StatusError, ValidationError},
    protocol::AddStudentForm,
};
use storage::KeyValueStore;
use tracing::{debug, info, warn};

use crate::{
    render::{render, DisplayTree},
    store::{sort, LoadOutcome, RosterStore},
};

pub const ENTER_SEARCH_TERM: &str = "Enter a search term.";
pub const SHOWING_ALL: &str = "Showing all students.";
pub const STUDENT_ADDED: &str = "Student added successfully.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Searching,
    Adding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Reject blank search submissions instead of showing everything.
    pub require_query: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            require_query: true,
        }
    }
}

/// Changes for the page to commit. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewUpdate {
    pub display: Option<DisplayTree>,
    pub search_status: Option<String>,
    pub add_status: Option<String>,
    pub reset_add_form: bool,
    pub error: Option<StatusError>,
}

pub struct RosterController<S> {
    store: RosterStore<S>,
    options: ControllerOptions,
    state: ControllerState,
    query: String,
    sort_key: Option<SortKey>,
}

impl<S: KeyValueStore> RosterController<S> {
    pub fn new(store: RosterStore<S>, options: ControllerOptions) -> Self {
        Self {
            store,
            options,
            state: ControllerState::Idle,
            query: String::new(),
            sort_key: None,
        }
    }

    pub fn store(&self) -> &RosterStore<S> {
        &self.store
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort_key
    }

    /// Page-ready: load the roster and show it, or the load-failure message.
    pub async fn initialize(&mut self) -> ViewUpdate {
        match self.store.load().await {
            Ok(outcome) => {
                let count = match outcome {
                    LoadOutcome::Restored(count) | LoadOutcome::Seeded(count) => count,
                };
                info!(?outcome, count, "roster page ready");
                ViewUpdate {
                    display: Some(render(self.store.list())),
                    ..ViewUpdate::default()
                }
            }
            Err(err) => {
                warn!(error = %err, "roster: load failed");
                ViewUpdate {
                    display: Some(DisplayTree::Placeholder(
                        err.display_message().to_string(),
                    )),
                    error: Some(StatusError::new(ErrorCode::Storage, err.display_message())),
                    ..ViewUpdate::default()
                }
            }
        }
    }

    pub fn submit_search(&mut self, query: &str) -> ViewUpdate {
        self.transition(ControllerState::Searching);
        let update = if self.options.require_query && query.trim().is_empty() {
            self.query.clear();
            ViewUpdate {
                display: Some(DisplayTree::Empty),
                search_status: Some(ENTER_SEARCH_TERM.to_string()),
                ..ViewUpdate::default()
            }
        } else {
            self.query = query.to_string();
            self.refresh_search()
        };
        self.transition(ControllerState::Idle);
        update
    }

    /// Re-applies the last search with a new ordering; `None` restores insertion order.
    pub fn change_sort(&mut self, key: Option<SortKey>) -> ViewUpdate {
        self.transition(ControllerState::Searching);
        self.sort_key = key;
        let update = self.refresh_search();
        self.transition(ControllerState::Idle);
        update
    }

    pub fn clear(&mut self) -> ViewUpdate {
        self.query.clear();
        self.sort_key = None;
        debug!("roster: search cleared");
        ViewUpdate {
            display: Some(render(self.store.list())),
            search_status: Some(SHOWING_ALL.to_string()),
            ..ViewUpdate::default()
        }
    }

    pub async fn submit_add(&mut self, form: &AddStudentForm) -> ViewUpdate {
        let candidate = match validate_candidate(form) {
            Ok(candidate) => candidate,
            Err(err) => {
                debug!(field = err.field(), "roster: add form rejected");
                return rejected(RosterError::from(err));
            }
        };

        self.transition(ControllerState::Adding);
        let result = self.store.create(candidate).await.map(|_| ());
        self.transition(ControllerState::Idle);

        match result {
            Ok(()) => ViewUpdate {
                display: Some(render(self.store.list())),
                add_status: Some(STUDENT_ADDED.to_string()),
                reset_add_form: true,
                ..ViewUpdate::default()
            },
            Err(err) => {
                if matches!(err, RosterError::Storage(_)) {
                    warn!(error = %err, "roster: failed to persist new student");
                }
                rejected(err)
            }
        }
    }

    fn refresh_search(&self) -> ViewUpdate {
        let matches = self.store.filter(&self.query);
        let visible = match self.sort_key {
            Some(key) => sort(matches, key),
            None => matches.collect(),
        };
        let status = if self.query.trim().is_empty() {
            SHOWING_ALL.to_string()
        } else {
            format!("Found {} student(s).", visible.len())
        };
        debug!(
            query = %self.query,
            sort = ?self.sort_key,
            matched = visible.len(),
            "roster: search applied"
        );
        ViewUpdate {
            display: Some(render(visible)),
            search_status: Some(status),
            ..ViewUpdate::default()
        }
    }

    fn transition(&mut self, next: ControllerState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "roster: controller state");
            self.state = next;
        }
    }
}

fn rejected(err: RosterError) -> ViewUpdate {
    ViewUpdate {
        add_status: Some(err.to_string()),
        error: Some(StatusError::from(&err)),
        ..ViewUpdate::default()
    }
}

/// Checks the add form and builds the record to store.
///
/// All text fields are trimmed and must be non-empty, the age must be a
/// positive number, and the name may not contain digits.
pub fn validate_candidate(form: &AddStudentForm) -> Result<Student, ValidationError> {
    let id = form.id.trim();
    let name = form.name.trim();
    let course = form.course.trim();
    let age_raw = form.age.trim();

    if id.is_empty() {
        return Err(ValidationError::MissingField("id"));
    }
    if name.is_empty() {
        return Err(ValidationError::MissingField("name"));
    }
    if age_raw.is_empty() {
        return Err(ValidationError::MissingField("age"));
    }
    if course.is_empty() {
        return Err(ValidationError::MissingField("course"));
    }

    let age = age_raw
        .parse::<f64>()
        .ok()
        .filter(|age| age.is_finite() && *age > 0.0)
        .ok_or_else(|| ValidationError::InvalidAge(age_raw.to_string()))?;

    if name.chars().any(|ch| ch.is_ascii_digit()) {
        return Err(ValidationError::NameContainsDigit);
    }

    Ok(Student::new(id, name, age, course))
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
