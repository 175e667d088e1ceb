//! In-memory roster mirrored to durable storage after every mutation.
//!
//! # Invariants
//! - Insertion order is preserved; records are never updated or removed.
//! - No two records share an id after trimming and case-folding.
//! - The persisted copy is rewritten in full after each successful `create`.

use std::{cmp::Ordering, sync::OnceLock};

use icu_collator::{
    options::{CollatorOptions, Strength},
    Collator, CollatorBorrowed,
};
use serde_json::Value;
use shared::{
    domain::{normalize_id, SortKey, Student},
    error::RosterError,
};
use storage::{read_json, write_json, KeyValueStore, StorageError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::seed::{fetch_or_empty, SeedSource};

pub const DEFAULT_ROSTER_KEY: &str = "lab3_students";
pub const LOAD_FAILED_MESSAGE: &str = "Error loading students from local storage.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A persisted roster of this many records was found.
    Restored(usize),
    /// Nothing usable was persisted; the seed of this many records was adopted.
    Seeded(usize),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read persisted roster: {0}")]
    Read(#[source] StorageError),
    #[error("failed to persist seeded roster: {0}")]
    Persist(#[source] StorageError),
}

impl LoadError {
    pub fn display_message(&self) -> &'static str {
        LOAD_FAILED_MESSAGE
    }
}

pub struct RosterStore<S> {
    storage: S,
    seed: Box<dyn SeedSource>,
    key: String,
    students: Vec<Student>,
}

impl<S: KeyValueStore> RosterStore<S> {
    pub fn new(storage: S, seed: Box<dyn SeedSource>) -> Self {
        Self {
            storage,
            seed,
            key: DEFAULT_ROSTER_KEY.to_string(),
            students: Vec::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn load(&mut self) -> Result<LoadOutcome, LoadError> {
        match read_json::<Value, _>(&self.storage, &self.key).await {
            Ok(Some(Value::Array(entries))) => {
                self.students = decode_roster(&self.key, entries);
                info!(key = %self.key, count = self.students.len(), "roster: restored from storage");
                return Ok(LoadOutcome::Restored(self.students.len()));
            }
            Ok(Some(other)) => {
                warn!(key = %self.key, kind = json_kind(&other), "roster: persisted value is not a list; reseeding");
            }
            Ok(None) => {
                info!(key = %self.key, "roster: nothing persisted; seeding");
            }
            Err(err) if err.is_parse() => {
                warn!(key = %self.key, error = %err, "roster: discarding unreadable persisted roster");
            }
            Err(err) => return Err(LoadError::Read(err)),
        }

        let seeded = fetch_or_empty(self.seed.as_ref()).await;
        write_json(&self.storage, &self.key, &seeded)
            .await
            .map_err(LoadError::Persist)?;
        self.students = seeded;
        Ok(LoadOutcome::Seeded(self.students.len()))
    }

    /// Appends `candidate` unless its normalized id is taken.
    ///
    /// Field-shape validation is the caller's job; only id uniqueness is
    /// checked here. A failed write leaves the roster as it was.
    pub async fn create(&mut self, candidate: Student) -> Result<&Student, RosterError> {
        let key = normalize_id(&candidate.id);
        if self.students.iter().any(|existing| existing.key() == key) {
            debug!(id = %candidate.id, "roster: duplicate id rejected");
            return Err(RosterError::DuplicateId { id: candidate.id });
        }

        let index = self.students.len();
        self.students.push(candidate);
        if let Err(err) = write_json(&self.storage, &self.key, &self.students).await {
            self.students.truncate(index);
            return Err(RosterError::Storage(err.to_string()));
        }

        let stored = &self.students[index];
        info!(id = %stored.id, count = self.students.len(), "roster: student created");
        Ok(stored)
    }

    pub fn list(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn filter(&self, query: &str) -> Matches<'_> {
        filter(&self.students, query)
    }
}

/// Decodes persisted entries one at a time. Entries that cannot become a
/// record (no usable `id`) are dropped; the rest are kept in order.
fn decode_roster(key: &str, entries: Vec<Value>) -> Vec<Student> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<Student>(entry) {
            Ok(student) => Some(student),
            Err(err) => {
                warn!(key, index, error = %err, "roster: skipping unreadable persisted record");
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Records matching a query, produced lazily.
///
/// Cloning yields an independent cursor, so the same result can be walked
/// more than once without re-running the query setup.
#[derive(Debug, Clone)]
pub struct Matches<'a> {
    remaining: std::slice::Iter<'a, Student>,
    needle: String,
}

impl<'a> Iterator for Matches<'a> {
    type Item = &'a Student;

    fn next(&mut self) -> Option<Self::Item> {
        let needle = &self.needle;
        self.remaining
            .by_ref()
            .find(|student| matches_query(student, needle))
    }
}

/// Case-insensitive substring match on id, name or course.
/// A blank query matches everything.
pub fn filter<'a>(records: &'a [Student], query: &str) -> Matches<'a> {
    Matches {
        remaining: records.iter(),
        needle: query.trim().to_lowercase(),
    }
}

fn matches_query(student: &Student, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [
        Some(student.id.as_str()),
        student.name.as_deref(),
        student.course.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Stable sort into a new sequence; ties keep their incoming order.
pub fn sort<'a, I>(records: I, key: SortKey) -> Vec<&'a Student>
where
    I: IntoIterator<Item = &'a Student>,
{
    let mut sorted: Vec<&'a Student> = records.into_iter().collect();
    match key {
        SortKey::Name => sorted.sort_by(|a, b| compare_names(a, b)),
        SortKey::Age => sorted.sort_by(|a, b| a.sort_age().total_cmp(&b.sort_age())),
    }
    sorted
}

/// Locale-aware, case-insensitive name order. Accents still separate names
/// (`Émile` sorts next to `Emile`, before `Zoe`); case differences tie.
fn compare_names(a: &Student, b: &Student) -> Ordering {
    let a = a.name.as_deref().unwrap_or_default();
    let b = b.name.as_deref().unwrap_or_default();
    match name_collator() {
        Some(collator) => collator.compare(a, b),
        None => a
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase)),
    }
}

fn name_collator() -> Option<&'static CollatorBorrowed<'static>> {
    static COLLATOR: OnceLock<Option<CollatorBorrowed<'static>>> = OnceLock::new();
    COLLATOR
        .get_or_init(|| {
            let mut options = CollatorOptions::default();
            options.strength = Some(Strength::Secondary);
            match Collator::try_new(Default::default(), options) {
                Ok(collator) => Some(collator),
                Err(err) => {
                    warn!(error = %err, "roster: collation data unavailable; comparing names by code point");
                    None
                }
            }
        })
        .as_ref()
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
