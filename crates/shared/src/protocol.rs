use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw add-form values exactly as typed; validation happens in the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddStudentForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub course: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub interest: String,
}

/// Discrete page events fed to the controllers, one per input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PageEvent {
    Search {
        query: String,
    },
    ChangeSort {
        key: Option<String>,
    },
    Clear,
    AddStudent(AddStudentForm),
    List,
    ShowHtml,
    Register(RegistrationForm),
    SignOut,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventParseError {
    #[error("empty input")]
    Empty,
    #[error("unknown event '{0}'")]
    UnknownEvent(String),
    #[error("expected {expected} '|'-separated fields, got {actual}")]
    FieldCount { expected: usize, actual: usize },
    #[error("malformed event json: {0}")]
    Json(String),
}

impl PageEvent {
    /// Parses either a JSON event (`{"type":"search","payload":{"query":"jo"}}`)
    /// or the shorthand form (`search jo`, `add 4|Ann|23|SE`, `sort age`).
    pub fn parse_line(line: &str) -> Result<Self, EventParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(EventParseError::Empty);
        }
        if line.starts_with('{') {
            return serde_json::from_str(line).map_err(|e| EventParseError::Json(e.to_string()));
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "search" => Ok(PageEvent::Search {
                query: rest.to_string(),
            }),
            "sort" => {
                let key = rest.trim();
                Ok(PageEvent::ChangeSort {
                    key: (!key.is_empty() && !key.eq_ignore_ascii_case("none"))
                        .then(|| key.to_string()),
                })
            }
            "clear" => Ok(PageEvent::Clear),
            "list" => Ok(PageEvent::List),
            "html" => Ok(PageEvent::ShowHtml),
            "signout" => Ok(PageEvent::SignOut),
            "quit" | "exit" => Ok(PageEvent::Quit),
            "add" => {
                let [id, name, age, course] = split_fields::<4>(rest)?;
                Ok(PageEvent::AddStudent(AddStudentForm {
                    id,
                    name,
                    age,
                    course,
                }))
            }
            "register" => {
                let [first_name, last_name, email, birth_date, interest] =
                    split_fields::<5>(rest)?;
                Ok(PageEvent::Register(RegistrationForm {
                    first_name,
                    last_name,
                    email,
                    birth_date,
                    interest,
                }))
            }
            other => Err(EventParseError::UnknownEvent(other.to_string())),
        }
    }
}

fn split_fields<const N: usize>(raw: &str) -> Result<[String; N], EventParseError> {
    let fields: Vec<String> = raw.split('|').map(str::to_string).collect();
    let actual = fields.len();
    fields
        .try_into()
        .map_err(|_| EventParseError::FieldCount {
            expected: N,
            actual,
        })
}
