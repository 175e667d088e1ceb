//! Default roster used when nothing has been persisted yet.

use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::Client;
use shared::domain::Student;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("seed request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to read seed file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("seed document is not a student array: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait SeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Student>, FetchError>;

    /// Short label for log lines.
    fn describe(&self) -> String;
}

/// Static JSON document served over HTTP.
pub struct HttpSeedSource {
    http: Client,
    url: Url,
}

impl HttpSeedSource {
    pub fn new(url: Url) -> Self {
        Self {
            http: Client::new(),
            url,
        }
    }
}

#[async_trait]
impl SeedSource for HttpSeedSource {
    async fn fetch(&self) -> Result<Vec<Student>, FetchError> {
        let students = self
            .http
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Student>>()
            .await?;
        Ok(students)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// Static JSON document on local disk.
pub struct FileSeedSource {
    path: PathBuf,
}

impl FileSeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SeedSource for FileSeedSource {
    async fn fetch(&self) -> Result<Vec<Student>, FetchError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FetchError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

pub struct BuiltinSeedSource;

#[async_trait]
impl SeedSource for BuiltinSeedSource {
    async fn fetch(&self) -> Result<Vec<Student>, FetchError> {
        Ok(builtin_students())
    }

    fn describe(&self) -> String {
        "builtin".to_string()
    }
}

pub fn builtin_students() -> Vec<Student> {
    vec![
        Student::new("1", "John", 21.0, "CS"),
        Student::new("2", "Jim", 22.0, "IT"),
        Student::new("3", "Joe", 20.0, "SE"),
    ]
}

/// Fetches the seed, degrading to an empty roster when the source fails.
pub async fn fetch_or_empty(source: &dyn SeedSource) -> Vec<Student> {
    match source.fetch().await {
        Ok(students) => {
            info!(
                source = %source.describe(),
                count = students.len(),
                "roster: seed fetched"
            );
            students
        }
        Err(err) => {
            warn!(
                source = %source.describe(),
                error = %err,
                "roster: seed unavailable; starting with an empty roster"
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
#[path = "tests/seed_tests.rs"]
mod tests;
