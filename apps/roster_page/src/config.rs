use std::{fs, path::Path};

use anyhow::Context;
use roster_core::{
    registration::DEFAULT_REGISTRATION_KEY, seed::SeedSource, store::DEFAULT_ROSTER_KEY,
    BuiltinSeedSource, FileSeedSource, HttpSeedSource,
};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub roster_key: String,
    pub registration_key: String,
    pub seed_url: Option<String>,
    pub seed_path: Option<String>,
    pub require_query: bool,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./data/roster.db".into(),
            roster_key: DEFAULT_ROSTER_KEY.into(),
            registration_key: DEFAULT_REGISTRATION_KEY.into(),
            seed_url: None,
            seed_path: None,
            require_query: true,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    /// Seed precedence: URL, then file, then the built-in roster.
    pub fn seed_source(&self) -> anyhow::Result<Box<dyn SeedSource>> {
        if let Some(raw) = self.seed_url.as_deref() {
            let url = Url::parse(raw).with_context(|| format!("invalid seed url '{raw}'"))?;
            return Ok(Box::new(HttpSeedSource::new(url)));
        }
        if let Some(path) = self.seed_path.as_deref() {
            return Ok(Box::new(FileSeedSource::new(path)));
        }
        Ok(Box::new(BuiltinSeedSource))
    }

    fn apply_file(&mut self, raw: &str) {
        let Ok(table) = toml::from_str::<toml::Table>(raw) else {
            return;
        };
        let value = |key: &str| {
            table.get(key).map(|value| match value {
                toml::Value::String(text) => text.clone(),
                other => other.to_string(),
            })
        };

        if let Some(v) = value("database_url") {
            self.database_url = v;
        }
        if let Some(v) = value("roster_key") {
            self.roster_key = v;
        }
        if let Some(v) = value("registration_key") {
            self.registration_key = v;
        }
        if let Some(v) = value("seed_url") {
            self.seed_url = Some(v);
        }
        if let Some(v) = value("seed_path") {
            self.seed_path = Some(v);
        }
        if let Some(v) = value("require_query").and_then(|v| parse_bool(&v)) {
            self.require_query = v;
        }
        if let Some(v) = value("log_filter") {
            self.log_filter = v;
        }
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let first = |names: &[&str]| names.iter().rev().find_map(|name| var(*name));

        if let Some(v) = first(&["ROSTER_DATABASE_URL", "APP__DATABASE_URL"]) {
            self.database_url = v;
        }
        if let Some(v) = first(&["ROSTER_KEY", "APP__ROSTER_KEY"]) {
            self.roster_key = v;
        }
        if let Some(v) = first(&["ROSTER_REGISTRATION_KEY", "APP__REGISTRATION_KEY"]) {
            self.registration_key = v;
        }
        if let Some(v) = first(&["ROSTER_SEED_URL", "APP__SEED_URL"]) {
            self.seed_url = Some(v);
        }
        if let Some(v) = first(&["ROSTER_SEED_PATH", "APP__SEED_PATH"]) {
            self.seed_path = Some(v);
        }
        if let Some(v) = first(&["ROSTER_REQUIRE_QUERY", "APP__REQUIRE_QUERY"])
            .and_then(|v| parse_bool(&v))
        {
            self.require_query = v;
        }
        if let Some(v) = first(&["RUST_LOG", "APP__LOG_FILTER"]) {
            self.log_filter = v;
        }
    }
}

/// Defaults, then the optional TOML file, then environment overrides
/// (`APP__*` wins over `ROSTER_*`).
pub fn load_settings(config_path: &Path) -> Settings {
    let mut settings = Settings::default();
    if let Ok(raw) = fs::read_to_string(config_path) {
        settings.apply_file(&raw);
    }
    settings.apply_env(|name| std::env::var(name).ok());
    settings
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Turns the configured location into a URL sqlx can open.
///
/// Accepted shapes: any `scheme://...` URL and `sqlite::memory:` pass through
/// untouched; `sqlite:path` and a bare file path become `sqlite://path`, with
/// Windows separators flipped. Blank input falls back to the default database.
pub fn normalize_database_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return Settings::default().database_url;
    }
    if raw.starts_with("sqlite::memory:") || raw.contains("://") {
        return raw.to_string();
    }

    let path = raw.strip_prefix("sqlite:").unwrap_or(raw);
    format!("sqlite://{}", path.replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn database_locations_become_sqlite_urls() {
        assert_eq!(normalize_database_url("./data/page.db"), "sqlite://./data/page.db");
        assert_eq!(normalize_database_url("sqlite:roster.db"), "sqlite://roster.db");
        assert_eq!(
            normalize_database_url(r"C:\pages\roster.db"),
            "sqlite://C:/pages/roster.db"
        );
        assert_eq!(normalize_database_url("sqlite://kept.db"), "sqlite://kept.db");
        assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(normalize_database_url("  "), Settings::default().database_url);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut settings = Settings::default();
        settings.apply_file(
            r#"
            database_url = "sqlite://./tmp/page.db"
            seed_url = "http://localhost:8080/students.json"
            require_query = false
            "#,
        );
        assert_eq!(settings.database_url, "sqlite://./tmp/page.db");
        assert_eq!(
            settings.seed_url.as_deref(),
            Some("http://localhost:8080/students.json")
        );
        assert!(!settings.require_query);
        assert_eq!(settings.roster_key, "lab3_students");
    }

    #[test]
    fn malformed_file_is_ignored() {
        let mut settings = Settings::default();
        settings.apply_file("this is = = not toml");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn app_prefixed_env_wins() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ROSTER_DATABASE_URL", "sqlite://a.db"),
            ("APP__DATABASE_URL", "sqlite://b.db"),
            ("ROSTER_REQUIRE_QUERY", "no"),
            ("APP__ROSTER_KEY", "roster_v2"),
        ]);
        let mut settings = Settings::default();
        settings.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(settings.database_url, "sqlite://b.db");
        assert_eq!(settings.roster_key, "roster_v2");
        assert!(!settings.require_query);
    }

    #[test]
    fn loads_settings_from_file_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("roster.toml");
        fs::write(&path, "registration_key = \"page_user\"\n").expect("write config");

        let settings = load_settings(&path);
        assert_eq!(settings.registration_key, "page_user");

        let missing = load_settings(&dir.path().join("absent.toml"));
        assert_eq!(missing.registration_key, DEFAULT_REGISTRATION_KEY);
    }

    #[test]
    fn seed_source_rejects_invalid_url() {
        let settings = Settings {
            seed_url: Some("not a url".into()),
            ..Settings::default()
        };
        assert!(settings.seed_source().is_err());

        let builtin = Settings::default().seed_source().expect("builtin");
        assert_eq!(builtin.describe(), "builtin");

        let file = Settings {
            seed_path: Some("students.json".into()),
            ..Settings::default()
        }
        .seed_source()
        .expect("file");
        assert_eq!(file.describe(), "students.json");
    }
}
