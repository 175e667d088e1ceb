//! Roster → display tree, plus adapters that commit a tree as markup or text.

use shared::domain::{format_age, Student};

pub const EMPTY_ROSTER_MESSAGE: &str = "No students available.";
pub const UNNAMED: &str = "Unnamed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayTree {
    /// Nothing shown; the container is cleared.
    Empty,
    /// A single line of text in place of the list.
    Placeholder(String),
    Students(Vec<StudentCard>),
}

/// One rendered record, as plain text. Escaping happens when it is committed
/// as markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentCard {
    pub heading: String,
    pub id: String,
    pub age: String,
    pub course: String,
}

pub fn render<'a, I>(records: I) -> DisplayTree
where
    I: IntoIterator<Item = &'a Student>,
{
    let cards: Vec<StudentCard> = records.into_iter().map(card_for).collect();
    if cards.is_empty() {
        DisplayTree::Placeholder(EMPTY_ROSTER_MESSAGE.to_string())
    } else {
        DisplayTree::Students(cards)
    }
}

fn card_for(student: &Student) -> StudentCard {
    StudentCard {
        heading: student
            .name
            .clone()
            .unwrap_or_else(|| UNNAMED.to_string()),
        id: student.id.clone(),
        age: format_age(student.age),
        course: student.course.clone().unwrap_or_default(),
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

impl DisplayTree {
    pub fn card_count(&self) -> usize {
        match self {
            DisplayTree::Students(cards) => cards.len(),
            _ => 0,
        }
    }

    /// Markup for the roster container.
    pub fn to_html(&self) -> String {
        match self {
            DisplayTree::Empty => String::new(),
            DisplayTree::Placeholder(text) => escape_html(text),
            DisplayTree::Students(cards) => {
                let mut html = String::from(r#"<div class="students-list">"#);
                for card in cards {
                    html.push_str(&format!(
                        r#"<div class="student-card"><h3>{}</h3><div><div><strong>ID:</strong> {}</div><div><strong>Age:</strong> {}</div><div><strong>Course:</strong> {}</div></div></div>"#,
                        escape_html(&card.heading),
                        escape_html(&card.id),
                        escape_html(&card.age),
                        escape_html(&card.course),
                    ));
                }
                html.push_str("</div>");
                html
            }
        }
    }

    /// Plain-text rendering for terminals.
    pub fn to_text(&self) -> String {
        match self {
            DisplayTree::Empty => String::new(),
            DisplayTree::Placeholder(text) => text.clone(),
            DisplayTree::Students(cards) => cards
                .iter()
                .map(|card| {
                    format!(
                        "{}\n  ID: {}\n  Age: {}\n  Course: {}",
                        card.heading, card.id, card.age, card.course
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_renders_placeholder() {
        let tree = render(&Vec::<Student>::new());
        assert_eq!(
            tree,
            DisplayTree::Placeholder(EMPTY_ROSTER_MESSAGE.to_string())
        );
        assert_eq!(tree.card_count(), 0);
        assert_eq!(tree.to_text(), "No students available.");
    }

    #[test]
    fn renders_one_card_per_record_in_order() {
        let records = vec![
            Student::new("1", "John", 21.0, "CS"),
            Student::new("2", "Jim", 22.5, "IT"),
        ];
        let DisplayTree::Students(cards) = render(&records) else {
            panic!("expected student cards");
        };
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].heading, "John");
        assert_eq!(cards[0].age, "21");
        assert_eq!(cards[1].age, "22.5");
        assert_eq!(cards[1].course, "IT");
    }

    #[test]
    fn missing_name_uses_placeholder_heading() {
        let records = vec![Student {
            id: "5".into(),
            name: None,
            age: None,
            course: None,
        }];
        let DisplayTree::Students(cards) = render(&records) else {
            panic!("expected student cards");
        };
        assert_eq!(cards[0].heading, UNNAMED);
        assert_eq!(cards[0].age, "");
        assert_eq!(cards[0].course, "");
    }

    #[test]
    fn escapes_all_five_metacharacters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn committed_markup_never_contains_raw_tags_from_values() {
        let records = vec![Student::new(
            "<script>",
            "<b>Eve</b>",
            20.0,
            "\"quoted\" & 'single'",
        )];
        let html = render(&records).to_html();
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<h3>&lt;b&gt;Eve&lt;/b&gt;</h3>"));
        assert!(html.contains("&quot;quoted&quot; &amp; &#39;single&#39;"));
        assert!(html.starts_with(r#"<div class="students-list">"#));
    }

    #[test]
    fn text_commit_shows_values_unescaped() {
        let records = vec![Student::new("7", "Tom & Jerry", 20.0, "R&D <lab>")];
        let tree = render(&records);
        assert_eq!(
            tree.to_text(),
            "Tom & Jerry\n  ID: 7\n  Age: 20\n  Course: R&D <lab>"
        );
        assert!(tree.to_html().contains("<strong>Course:</strong> R&amp;D &lt;lab&gt;"));
    }

    #[test]
    fn empty_tree_commits_nothing() {
        assert_eq!(DisplayTree::Empty.to_html(), "");
        assert_eq!(DisplayTree::Empty.to_text(), "");
    }
}
